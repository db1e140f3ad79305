#![allow(dead_code)]

use std::path::Path;

/// Build a two-repository corpus under `root`.
///
/// `widgets` has Rust sources mentioning `compute`; `gadgets` has a lone
/// text file, so repo-scoped assertions have a negative case.
pub fn write_corpus(root: &Path) {
    let widgets = root.join("widgets");
    std::fs::create_dir_all(widgets.join("src")).unwrap();
    std::fs::write(
        widgets.join("src/main.rs"),
        "fn main() {\n    let answer = compute();\n    println!(\"{answer}\");\n}\n",
    )
    .unwrap();
    std::fs::write(
        widgets.join("src/lib.rs"),
        "pub fn compute() -> u64 {\n    42\n}\n",
    )
    .unwrap();
    std::fs::write(widgets.join("README.md"), "# widgets\ncompute things\n").unwrap();

    let gadgets = root.join("gadgets");
    std::fs::create_dir_all(&gadgets).unwrap();
    std::fs::write(gadgets.join("notes.txt"), "nothing here\n").unwrap();
}

/// `(event, data)` pairs parsed from a raw SSE body.
pub fn parse_sse(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .filter_map(|block| {
            let mut event = None;
            let mut data = String::new();
            for line in block.lines() {
                if let Some(rest) = line.strip_prefix("event: ") {
                    event = Some(rest.to_string());
                } else if let Some(rest) = line.strip_prefix("data: ") {
                    data.push_str(rest);
                }
            }
            event.map(|e| (e, data))
        })
        .collect()
}

pub fn event_names(events: &[(String, String)]) -> Vec<&str> {
    events.iter().map(|(e, _)| e.as_str()).collect()
}

pub fn payload<'a>(
    events: &'a [(String, String)],
    name: &str,
    index: usize,
) -> Option<serde_json::Value> {
    events
        .iter()
        .filter(|(e, _)| e == name)
        .nth(index)
        .map(|(_, d)| serde_json::from_str(d).expect("valid JSON payload"))
}

pub fn last_payload(events: &[(String, String)], name: &str) -> Option<serde_json::Value> {
    events
        .iter()
        .rev()
        .find(|(e, _)| e == name)
        .map(|(_, d)| serde_json::from_str(d).expect("valid JSON payload"))
}
