//! Match-to-wire conversion.
//!
//! Each [`Match`] becomes exactly one [`MatchRecord`]. File matches are
//! classified by which sub-collections are populated, symbols taking
//! priority over content and content over path-only.

use super::wire::{
    ChunkMatchRecord, CommitRecord, ContentRecord, LineMatchRecord, LocationRecord, MatchRecord,
    PathRecord, PersonRecord, RangeRecord, RepoAttrs, RepoRecord, SignatureRecord,
    SymbolEntryRecord, SymbolRecord, TeamRecord, UserRecord,
};
use fathom_domain::{
    ChunkMatch, CommitMatch, FileMatch, Location, Match, OwnerMatch, Range, RepoMatch,
    RepoMetadata, RepoRef, SearchError, Signature,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// When set, content records carry raw chunk matches; otherwise the
    /// chunks are projected into line matches.
    pub chunk_matches: bool,
}

/// Convert one match into its wire record. `meta` is the cached metadata
/// for the match's repository; owner matches carry no repository and take
/// `None`.
pub fn convert_match(
    m: &Match,
    meta: Option<&RepoMetadata>,
    opts: ConvertOptions,
) -> Result<MatchRecord, SearchError> {
    match m {
        Match::File(fm) => convert_file(fm, meta, opts),
        Match::Repo(rm) => Ok(convert_repo(rm, meta)),
        Match::Commit(cm) => Ok(convert_commit(cm, meta)),
        Match::Owner(om) => Ok(convert_owner(om)),
    }
}

fn repo_attrs(repo: &RepoRef, meta: Option<&RepoMetadata>) -> RepoAttrs {
    RepoAttrs {
        repository: repo.name.to_string(),
        repository_id: repo.id,
        repo_stars: meta.and_then(|m| (m.stars > 0).then_some(m.stars)),
        repo_last_fetched: meta.and_then(|m| m.last_fetched),
    }
}

fn branches(rev: &Option<String>) -> Option<Vec<String>> {
    rev.as_ref().map(|r| vec![r.clone()])
}

fn convert_file(
    fm: &FileMatch,
    meta: Option<&RepoMetadata>,
    opts: ConvertOptions,
) -> Result<MatchRecord, SearchError> {
    if !fm.symbols.is_empty() {
        return Ok(MatchRecord::Symbol(SymbolRecord {
            repo: repo_attrs(&fm.repo, meta),
            path: fm.path.clone(),
            commit: fm.commit_id.clone(),
            branches: branches(&fm.input_rev),
            symbols: fm
                .symbols
                .iter()
                .map(|s| SymbolEntryRecord {
                    url: s.url.clone(),
                    name: s.name.clone(),
                    container_name: s.container_name.clone(),
                    kind: s
                        .kind
                        .as_deref()
                        .map(str::to_uppercase)
                        .unwrap_or_else(|| "UNKNOWN".to_string()),
                    line: s.line,
                })
                .collect(),
        }));
    }

    if !fm.chunks.is_empty() {
        for chunk in &fm.chunks {
            if !chunk.ranges_in_bounds() {
                return Err(SearchError::Conversion(format!(
                    "chunk range out of bounds in {}:{}",
                    fm.repo.name, fm.path
                )));
            }
        }
        let (chunk_matches, line_matches) = if opts.chunk_matches {
            (Some(fm.chunks.iter().map(chunk_record).collect()), None)
        } else {
            (None, Some(project_line_matches(&fm.chunks)))
        };
        return Ok(MatchRecord::Content(ContentRecord {
            repo: repo_attrs(&fm.repo, meta),
            path: fm.path.clone(),
            commit: fm.commit_id.clone(),
            branches: branches(&fm.input_rev),
            chunk_matches,
            line_matches,
            debug: fm.debug.clone(),
        }));
    }

    Ok(MatchRecord::Path(PathRecord {
        repo: repo_attrs(&fm.repo, meta),
        path: fm.path.clone(),
        commit: fm.commit_id.clone(),
        branches: branches(&fm.input_rev),
        debug: fm.debug.clone(),
    }))
}

fn convert_repo(rm: &RepoMatch, meta: Option<&RepoMetadata>) -> MatchRecord {
    MatchRecord::Repo(RepoRecord {
        repo: repo_attrs(&rm.repo, meta),
        branches: branches(&rm.rev),
        description: meta.and_then(|m| m.description.clone()),
        fork: meta.is_some_and(|m| m.fork),
        archived: meta.is_some_and(|m| m.archived),
        private: meta.is_some_and(|m| m.private),
        repository_matches: rm.name_matches.iter().map(range_record).collect(),
        description_matches: rm.description_matches.iter().map(range_record).collect(),
        metadata: meta.map(|m| m.key_value_pairs.clone()).unwrap_or_default(),
    })
}

fn convert_commit(cm: &CommitMatch, meta: Option<&RepoMetadata>) -> MatchRecord {
    MatchRecord::Commit(CommitRecord {
        repo: repo_attrs(&cm.repo, meta),
        oid: cm.oid.clone(),
        url: cm.url.clone(),
        author: signature_record(&cm.author),
        committer: cm.committer.as_ref().map(signature_record),
        message: cm.message.clone(),
        content: cm.message.clone(),
        ranges: cm
            .message_matches
            .iter()
            .map(|r| [r.start.line, r.start.column, r.len() as u32])
            .collect(),
        label: cm.label.clone(),
        detail: cm.detail.clone(),
    })
}

fn convert_owner(om: &OwnerMatch) -> MatchRecord {
    match om {
        OwnerMatch::Person(p) => MatchRecord::Person(PersonRecord {
            handle: p.handle.clone(),
            email: p.email.clone(),
            user: p.user.as_ref().map(|u| UserRecord {
                username: u.username.clone(),
                display_name: u.display_name.clone(),
                avatar_url: u.avatar_url.clone(),
            }),
        }),
        OwnerMatch::Team(t) => MatchRecord::Team(TeamRecord {
            handle: t.handle.clone(),
            email: t.email.clone(),
            name: t.name.clone(),
            display_name: t.display_name.clone(),
        }),
    }
}

fn signature_record(s: &Signature) -> SignatureRecord {
    SignatureRecord {
        name: s.name.clone(),
        email: s.email.clone(),
        date: s.date,
    }
}

fn location_record(l: &Location) -> LocationRecord {
    LocationRecord {
        offset: l.offset,
        line: l.line,
        column: l.column,
    }
}

fn range_record(r: &Range) -> RangeRecord {
    RangeRecord {
        start: location_record(&r.start),
        end: location_record(&r.end),
    }
}

fn chunk_record(c: &ChunkMatch) -> ChunkMatchRecord {
    ChunkMatchRecord {
        content: c.content.clone(),
        content_start: location_record(&c.content_start),
        ranges: c.ranges.iter().map(range_record).collect(),
    }
}

/// Project chunk matches into the line-oriented representation: one entry
/// per line that contains ranges, in content order, each with its
/// `[offset, length]` pairs ascending by offset.
fn project_line_matches(chunks: &[ChunkMatch]) -> Vec<LineMatchRecord> {
    let mut out = Vec::new();
    for chunk in chunks {
        let base = chunk.content_start.offset;
        let mut line_start = 0usize; // byte offset of the line within the chunk
        for (i, line) in chunk.content.split('\n').enumerate() {
            let line_number = chunk.content_start.line + i as u32;
            let abs_start = base + line_start;
            let abs_end = abs_start + line.len();

            let mut spans: Vec<[u32; 2]> = Vec::new();
            for range in &chunk.ranges {
                let start = range.start.offset.max(abs_start);
                let end = range.end.offset.min(abs_end);
                if end > start {
                    spans.push([(start - abs_start) as u32, (end - start) as u32]);
                }
            }
            if !spans.is_empty() {
                spans.sort_unstable();
                out.push(LineMatchRecord {
                    preview: line.to_string(),
                    line_number,
                    offset_and_lengths: spans,
                });
            }
            line_start += line.len() + 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_domain::{PersonOwner, RepoId, SymbolEntry};

    fn repo() -> RepoRef {
        RepoRef::new(RepoId(1), "acme/widgets")
    }

    fn chunk(content: &str, start_offset: usize, start_line: u32, ranges: Vec<Range>) -> ChunkMatch {
        ChunkMatch {
            content: content.into(),
            content_start: Location::new(start_offset, start_line, 0),
            ranges,
        }
    }

    fn range(start: usize, end: usize, line: u32, col: u32) -> Range {
        Range::new(
            Location::new(start, line, col),
            Location::new(end, line, col + (end - start) as u32),
        )
    }

    #[test]
    fn symbols_take_priority_over_chunks() {
        let fm = FileMatch {
            symbols: vec![SymbolEntry {
                name: "main".into(),
                container_name: None,
                kind: Some("function".into()),
                line: 0,
                url: "/acme/widgets/-/blob/src/main.rs#L1".into(),
            }],
            chunks: vec![chunk("fn main() {}", 0, 0, vec![range(3, 7, 0, 3)])],
            ..FileMatch::path_only(repo(), "src/main.rs", "cafe")
        };
        let record = convert_match(&Match::File(fm), None, ConvertOptions::default()).unwrap();
        match record {
            MatchRecord::Symbol(s) => {
                assert_eq!(s.symbols[0].kind, "FUNCTION");
            }
            other => panic!("expected symbol record, got {other:?}"),
        }
    }

    #[test]
    fn unclassified_symbol_kind_is_unknown() {
        let fm = FileMatch {
            symbols: vec![SymbolEntry {
                name: "x".into(),
                container_name: None,
                kind: None,
                line: 3,
                url: String::new(),
            }],
            ..FileMatch::path_only(repo(), "src/lib.rs", "cafe")
        };
        match convert_match(&Match::File(fm), None, ConvertOptions::default()).unwrap() {
            MatchRecord::Symbol(s) => assert_eq!(s.symbols[0].kind, "UNKNOWN"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_file_match_is_path_record() {
        let fm = FileMatch::path_only(repo(), "README.md", "cafe");
        match convert_match(&Match::File(fm), None, ConvertOptions::default()).unwrap() {
            MatchRecord::Path(p) => assert_eq!(p.path, "README.md"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn chunk_flag_selects_representation() {
        let fm = FileMatch {
            chunks: vec![chunk("let x = 1;", 0, 0, vec![range(4, 5, 0, 4)])],
            ..FileMatch::path_only(repo(), "src/lib.rs", "cafe")
        };
        let m = Match::File(fm);

        let with_chunks =
            convert_match(&m, None, ConvertOptions { chunk_matches: true }).unwrap();
        match with_chunks {
            MatchRecord::Content(c) => {
                assert!(c.chunk_matches.is_some());
                assert!(c.line_matches.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }

        let with_lines = convert_match(&m, None, ConvertOptions::default()).unwrap();
        match with_lines {
            MatchRecord::Content(c) => {
                assert!(c.chunk_matches.is_none());
                let lines = c.line_matches.unwrap();
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].offset_and_lengths, vec![[4, 1]]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn line_projection_splits_multiline_ranges_in_order() {
        // "alpha\nbeta\ngamma" with one range covering "ta\ngam" and one
        // inside "alpha"
        let content = "alpha\nbeta\ngamma";
        let ranges = vec![
            range(8, 14, 1, 2), // spans lines 1 and 2
            range(1, 3, 0, 1),  // inside line 0
        ];
        let records = project_line_matches(&[chunk(content, 0, 0, ranges)]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].line_number, 0);
        assert_eq!(records[0].offset_and_lengths, vec![[1, 2]]);
        assert_eq!(records[1].preview, "beta");
        assert_eq!(records[1].offset_and_lengths, vec![[2, 2]]);
        assert_eq!(records[2].preview, "gamma");
        assert_eq!(records[2].offset_and_lengths, vec![[0, 3]]);
    }

    #[test]
    fn offsets_within_a_line_are_ascending() {
        let content = "aa bb aa bb";
        let ranges = vec![range(6, 8, 0, 6), range(0, 2, 0, 0)];
        let records = project_line_matches(&[chunk(content, 0, 0, ranges)]);
        assert_eq!(records[0].offset_and_lengths, vec![[0, 2], [6, 2]]);
    }

    #[test]
    fn out_of_bounds_chunk_is_a_conversion_error() {
        let fm = FileMatch {
            chunks: vec![chunk("short", 100, 0, vec![range(90, 95, 0, 0)])],
            ..FileMatch::path_only(repo(), "src/lib.rs", "cafe")
        };
        let err = convert_match(&Match::File(fm), None, ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, SearchError::Conversion(_)));
    }

    #[test]
    fn repo_match_lifts_cached_metadata() {
        let mut meta = RepoMetadata::named("acme/widgets");
        meta.stars = 7;
        meta.description = Some("widget factory".into());
        meta.archived = true;
        let rm = RepoMatch {
            repo: repo(),
            rev: Some("v2".into()),
            name_matches: vec![range(0, 4, 0, 0)],
            description_matches: vec![],
        };
        match convert_match(&Match::Repo(rm), Some(&meta), ConvertOptions::default()).unwrap() {
            MatchRecord::Repo(r) => {
                assert_eq!(r.repo.repo_stars, Some(7));
                assert_eq!(r.description.as_deref(), Some("widget factory"));
                assert!(r.archived);
                assert_eq!(r.branches, Some(vec!["v2".into()]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn owner_person_and_team_convert() {
        let person = Match::Owner(OwnerMatch::Person(PersonOwner {
            handle: "alice".into(),
            email: None,
            user: None,
        }));
        assert!(matches!(
            convert_match(&person, None, ConvertOptions::default()).unwrap(),
            MatchRecord::Person(_)
        ));
    }

    #[test]
    fn commit_ranges_project_to_triples() {
        let cm = CommitMatch {
            repo: repo(),
            oid: "deadbeef".into(),
            author: Signature {
                name: "alice".into(),
                email: "alice@example.com".into(),
                date: chrono::Utc::now(),
            },
            committer: None,
            message: "fix: widget overflow".into(),
            message_matches: vec![range(5, 11, 0, 5)],
            url: "/acme/widgets/-/commit/deadbeef".into(),
            label: "acme/widgets · deadbeef".into(),
            detail: "3 days ago".into(),
        };
        match convert_match(&Match::Commit(cm), None, ConvertOptions::default()).unwrap() {
            MatchRecord::Commit(c) => assert_eq!(c.ranges, vec![[0, 5, 6]]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
