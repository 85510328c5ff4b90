use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["shelfpost"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_run_command() {
    let cli = Cli::try_parse_from(["shelfpost", "run"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Run { dry_run: false })
    ));
}

#[test]
fn parses_run_dry_run() {
    let cli = Cli::try_parse_from(["shelfpost", "run", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Run { dry_run: true })));
}

#[test]
fn parses_preview_with_positional_text() {
    let cli = Cli::try_parse_from([
        "shelfpost",
        "preview",
        "--link",
        "https://www.norli.no/boker/stormen-9788203",
        "En",
        "kort",
        "tekst.",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Preview { ref link, file: None, ref text })
            if link == "https://www.norli.no/boker/stormen-9788203"
                && text == &["En", "kort", "tekst."]
    ));
}

#[test]
fn parses_preview_from_file() {
    let cli = Cli::try_parse_from([
        "shelfpost",
        "preview",
        "--link",
        "http://x/1",
        "--file",
        "review.txt",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Preview { file: Some(ref f), ref text, .. })
            if f.as_os_str() == "review.txt" && text.is_empty()
    ));
}

#[test]
fn preview_rejects_file_and_text_together() {
    let result = Cli::try_parse_from([
        "shelfpost",
        "preview",
        "--link",
        "http://x/1",
        "--file",
        "review.txt",
        "ekstra",
    ]);
    assert!(result.is_err());
}

#[test]
fn preview_requires_link() {
    assert!(Cli::try_parse_from(["shelfpost", "preview", "tekst"]).is_err());
}

#[test]
fn preview_rejects_empty_link() {
    let result = Cli::try_parse_from(["shelfpost", "preview", "--link", "", "tekst"]);
    assert!(result.is_err());
}

#[test]
fn parses_state_with_default_recent() {
    let cli = Cli::try_parse_from(["shelfpost", "state"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::State { recent: history::DEFAULT_RECENT })
    ));
}

#[test]
fn parses_state_recent_override() {
    let cli = Cli::try_parse_from(["shelfpost", "state", "--recent", "12"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::State { recent: 12 })));
}

#[test]
fn unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["shelfpost", "post"]).is_err());
}

#[test]
fn outcome_labels_are_distinct() {
    let outcomes = [
        RunOutcome::Published { url: String::new() },
        RunOutcome::NoCandidates,
        RunOutcome::CatalogFailed,
        RunOutcome::IncompleteDetail,
        RunOutcome::GenerationFailed,
        RunOutcome::PublishFailed,
    ];
    let labels: std::collections::HashSet<_> = outcomes.iter().map(outcome_label).collect();
    assert_eq!(labels.len(), outcomes.len());
}
