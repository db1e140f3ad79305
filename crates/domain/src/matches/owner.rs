/// An ownership hit. The inner payload is itself a closed sum: a person or
/// a team.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnerMatch {
    Person(PersonOwner),
    Team(TeamOwner),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonOwner {
    pub handle: String,
    pub email: Option<String>,
    /// Present when the handle resolved to a registered user.
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamOwner {
    pub handle: String,
    pub email: Option<String>,
    pub name: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}
