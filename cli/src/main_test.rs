use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("rulegate-cli").chain(args.iter().copied())).unwrap()
}

#[test]
fn no_subcommand_defaults_to_repl() {
    let cli = parse(&[]);
    assert!(cli.command.is_none());
}

#[test]
fn ask_collects_every_question() {
    let cli = parse(&["ask", "旗門とは？", "ペナルティは？"]);
    match cli.command {
        Some(Command::Ask { questions }) => assert_eq!(questions, ["旗門とは？", "ペナルティは？"]),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn ask_requires_a_question() {
    assert!(Cli::try_parse_from(["rulegate-cli", "ask"]).is_err());
}

#[test]
fn scope_flags_build_request_template() {
    let cli = parse(&["--discipline", "slalom", "--rule-edition", "2025", "--top-k", "8", "--min-confidence", "0.3", "ping"]);
    let template = cli.scope.template();

    assert_eq!(template.question_ja, "");
    assert_eq!(template.discipline.as_deref(), Some("slalom"));
    assert_eq!(template.rule_edition.as_deref(), Some("2025"));
    let options = template.options.unwrap();
    assert_eq!(options.top_k.map(NonZeroU32::get), Some(8));
    assert_eq!(options.min_confidence, Some(0.3));
}

#[test]
fn template_without_flags_has_no_options() {
    let template = ScopeArgs::default().template();
    assert_eq!(template, AskRequest::default());
}

#[test]
fn zero_top_k_is_rejected() {
    assert!(Cli::try_parse_from(["rulegate-cli", "--top-k", "0", "ping"]).is_err());
}

#[test]
fn min_confidence_must_be_in_unit_range() {
    assert_eq!(parse_confidence("0.5"), Ok(0.5));
    assert!(parse_confidence("1.5").is_err());
    assert!(parse_confidence("-0.1").is_err());
    assert!(parse_confidence("high").is_err());
}
