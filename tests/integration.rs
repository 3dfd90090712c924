use std::path::PathBuf;

use expect_test::expect;
use runlens::{
    block_at_line, code_lenses, detect_blocks, load_settings, Block, DocumentKind, RunnerRegistry,
    Settings, TextLines,
};
use tower_lsp::lsp_types::Url;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Format blocks into a deterministic, human-readable string.
///
/// Each block becomes a header line followed by its code, one `|` line per
/// code line:
///   <kind> <language> @<anchor> [<start>..=<end>]
fn format_blocks(blocks: &[Block]) -> String {
    if blocks.is_empty() {
        return "(no blocks)".to_string();
    }

    blocks
        .iter()
        .map(|b| {
            let mut out = format!(
                "{:?} {} @{} [{}..={}]",
                b.kind, b.language_id, b.anchor_line, b.start_line, b.end_line
            );
            for line in b.code.split('\n') {
                out.push_str("\n  |");
                if !line.is_empty() {
                    out.push(' ');
                    out.push_str(line);
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn detect_with(registry: &RunnerRegistry, language_id: &str, lines: &[&str]) -> String {
    let doc = TextLines::from_lines(lines.iter().copied(), language_id);
    format_blocks(&detect_blocks(&doc, registry))
}

/// Detect blocks in a markdown document with the built-in runners.
fn markdown(lines: &[&str]) -> String {
    detect_with(&RunnerRegistry::builtin(), "markdown", lines)
}

/// Detect blocks in a plain document with the built-in runners.
fn plain(language_id: &str, lines: &[&str]) -> String {
    detect_with(&RunnerRegistry::builtin(), language_id, lines)
}

fn fixture_settings(name: &str) -> Settings {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .join("runlens.toml");
    load_settings(&path)
}

// ---------------------------------------------------------------------------
// Tests — fenced documents
// ---------------------------------------------------------------------------

#[test]
fn fenced_python_block() {
    let actual = markdown(&["```python", "print(1)", "print(2)", "```"]);
    let expected = expect![[r#"
        Fence python @0 [1..=2]
          | print(1)
          | print(2)"#]];
    expected.assert_eq(&actual);
}

#[test]
fn fenced_alias_resolves_to_canonical_language() {
    let actual = markdown(&["```py", "import sys", "```"]);
    let expected = expect![[r#"
        Fence python @0 [1..=1]
          | import sys"#]];
    expected.assert_eq(&actual);
}

#[test]
fn untagged_fence_runs_as_shell() {
    let actual = markdown(&["```", "echo hi", "```"]);
    let expected = expect![[r#"
        Fence shellscript @0 [1..=1]
          | echo hi"#]];
    expected.assert_eq(&actual);
}

#[test]
fn readme_with_mixed_fences() {
    let actual = markdown(&[
        "# Setup",
        "",
        "```bash",
        "cargo build",
        "",
        "cargo test",
        "```",
        "",
        "```toml",
        "[package]",
        "```",
        "",
        "```js",
        "```",
        "",
        "```ts",
        "const x: number = 1;",
        "console.log(x);",
        "```",
        "",
        "```python",
        "never closed",
    ]);
    let expected = expect![[r#"
        Fence bash @2 [3..=5]
          | cargo build
          |
          | cargo test
        Fence typescript @15 [16..=17]
          | const x: number = 1;
          | console.log(x);"#]];
    expected.assert_eq(&actual);
}

#[test]
fn fence_tag_without_runner_is_skipped() {
    let actual = markdown(&["```mermaid", "graph TD;", "```"]);
    let expected = expect![[r#"(no blocks)"#]];
    expected.assert_eq(&actual);
}

#[test]
fn tagged_fence_line_closes_the_open_fence() {
    let actual = markdown(&["```sh", "echo 1", "```python", "print(2)", "```"]);
    let expected = expect![[r#"
        Fence shellscript @0 [1..=1]
          | echo 1"#]];
    expected.assert_eq(&actual);
}

// ---------------------------------------------------------------------------
// Tests — plain documents
// ---------------------------------------------------------------------------

#[test]
fn plain_single_blank_keeps_one_section() {
    let actual = plain("python", &["a", "", "b"]);
    let expected = expect![[r#"
        File python @0 [0..=2]
          | a
          |
          | b"#]];
    expected.assert_eq(&actual);
}

#[test]
fn plain_double_blank_splits_sections() {
    let actual = plain("python", &["a", "", "", "b"]);
    let expected = expect![[r#"
        File python @0 [0..=3]
          | a
          |
          |
          | b
        Section python @0 [0..=0]
          | a
        Section python @3 [3..=3]
          | b"#]];
    expected.assert_eq(&actual);
}

#[test]
fn plain_unsupported_language_has_no_blocks() {
    let actual = plain("plaintext", &["a", "", "", "b"]);
    let expected = expect![[r#"(no blocks)"#]];
    expected.assert_eq(&actual);
}

#[test]
fn plain_script_with_sections() {
    let actual = plain(
        "shellscript",
        &[
            "#!/bin/sh",
            "set -e",
            "",
            "",
            "echo build",
            "",
            "echo test",
            "",
            "",
            "",
            "echo deploy",
            "",
        ],
    );
    let expected = expect![[r#"
        File shellscript @0 [0..=11]
          | #!/bin/sh
          | set -e
          |
          |
          | echo build
          |
          | echo test
          |
          |
          |
          | echo deploy
          |
        Section shellscript @0 [0..=1]
          | #!/bin/sh
          | set -e
        Section shellscript @4 [4..=6]
          | echo build
          |
          | echo test
        Section shellscript @10 [10..=10]
          | echo deploy"#]];
    expected.assert_eq(&actual);
}

#[test]
fn plain_whole_file_block_always_first() {
    let registry = RunnerRegistry::builtin();
    let documents: &[&[&str]] = &[
        &[""],
        &["", ""],
        &["x"],
        &["x", "", "", "y"],
        &["", "", "x", "", "", "y", "", ""],
    ];
    for lines in documents {
        let doc = TextLines::from_lines(lines.iter().copied(), "python");
        let blocks = detect_blocks(&doc, &registry);
        assert_eq!(blocks[0].start_line, 0, "{lines:?}");
        assert_eq!(blocks[0].end_line, lines.len() - 1, "{lines:?}");
        assert_eq!(blocks[0].code, lines.join("\n"), "{lines:?}");
        assert!(blocks.iter().all(|b| b.anchor_line <= b.start_line));
        assert!(blocks.iter().all(|b| b.start_line <= b.end_line));
    }
}

#[test]
fn document_kind_can_be_chosen_explicitly() {
    // A markdown file segmented as plain text needs a markdown runner.
    let doc = TextLines::new("```sh\nls\n```", "markdown");
    let blocks = DocumentKind::Plain.segment(&doc, &RunnerRegistry::builtin());
    assert!(blocks.is_empty());

    let doc = TextLines::new("```sh\nls\n```", "shellscript");
    let blocks = DocumentKind::Tagged.segment(&doc, &RunnerRegistry::builtin());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].code, "ls");
}

// ---------------------------------------------------------------------------
// Tests — settings overrides
// ---------------------------------------------------------------------------

#[test]
fn override_settings_fixture() {
    let settings = fixture_settings("overrides");
    assert!(settings.show_code_lens);
    assert!(!settings.reuse_executor);
    assert_eq!(settings.shell, "bash");

    let registry = settings.registry();
    assert_eq!(registry.get("python").unwrap().command, "uv run {file}");
    assert_eq!(registry.get("shellscript").unwrap().command, "bash {file}");
}

#[test]
fn override_makes_new_language_runnable() {
    let registry = fixture_settings("overrides").registry();
    let actual = detect_with(
        &registry,
        "markdown",
        &["```haskell", "main = putStrLn \"hi\"", "```"],
    );
    let expected = expect![[r#"
        Fence haskell @0 [1..=1]
          | main = putStrLn "hi""#]];
    expected.assert_eq(&actual);

    let actual = detect_with(&registry, "haskell", &["main = pure ()"]);
    let expected = expect![[r#"
        File haskell @0 [0..=0]
          | main = pure ()"#]];
    expected.assert_eq(&actual);
}

#[test]
fn missing_fixture_gives_default_settings() {
    assert_eq!(fixture_settings("does-not-exist"), Settings::default());
}

// ---------------------------------------------------------------------------
// Tests — cursor selection and lenses
// ---------------------------------------------------------------------------

#[test]
fn cursor_selects_fence_from_opening_line_to_last_content_line() {
    let doc = TextLines::new("text\n```sh\nls\npwd\n```\ntext", "markdown");
    let blocks = detect_blocks(&doc, &RunnerRegistry::builtin());

    let selected: Vec<_> = (0..6)
        .map(|line| block_at_line(&blocks, line).map(|b| b.anchor_line))
        .collect();
    assert_eq!(selected, [None, Some(1), Some(1), Some(1), None, None]);
}

#[test]
fn cursor_in_plain_document_selects_whole_file() {
    let doc = TextLines::new("a\n\n\nb", "python");
    let blocks = detect_blocks(&doc, &RunnerRegistry::builtin());

    let block = block_at_line(&blocks, 3).unwrap();
    assert_eq!(block.code, "a\n\n\nb");
}

#[test]
fn lenses_for_markdown_document() {
    let uri = Url::parse("file:///work/README.md").unwrap();
    let doc = TextLines::new("# Demo\n```py\nprint(1)\n```\n```rb\nputs 2\n```\n", "markdown");
    let blocks = detect_blocks(&doc, &RunnerRegistry::builtin());

    let actual = code_lenses(&uri, &blocks)
        .iter()
        .map(|lens| {
            let command = lens.command.as_ref().unwrap();
            format!(
                "{}:{} {} -> {}",
                lens.range.start.line, lens.range.start.character, command.title, command.command
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let expected = expect![[r#"
        1:0 ▶ Run python -> runlens.runBlock
        4:0 ▶ Run ruby -> runlens.runBlock"#]];
    expected.assert_eq(&actual);
}
