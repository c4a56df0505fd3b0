use std::sync::Arc;

use super::*;
use crate::runtime::{LocalRuntime, ShellAlias, ShellEnvironment, StaticRuntime};
use crate::spec::{ArgumentSpec, CommandSpec, OptionSpec, SpecRegistry, Suggestion};

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn names(suggestions: &[Suggestion]) -> Vec<&str> {
    suggestions.iter().map(|s| s.name()).collect()
}

fn engine_for(spec: CommandSpec, runtime: StaticRuntime) -> CompletionEngine {
    CompletionEngine::new(
        Arc::new(SpecRegistry::new().with_spec(spec)),
        Arc::new(runtime),
    )
}

fn context(runtime: StaticRuntime) -> RequestContext {
    RequestContext::new(Arc::new(SpecRegistry::new()), Arc::new(runtime))
}

#[tokio::test]
async fn subcommand_token_becomes_single_child() {
    let spec = CommandSpec::new("tool")
        .with_subcommand(CommandSpec::new("A"))
        .with_subcommand(CommandSpec::new("B"));
    let ctx = context(StaticRuntime::new());

    let tree = TreeBuilder::new(&ctx)
        .build("tool", Arc::new(spec), &tokens(&["A"]))
        .await;

    let children = tree.children(tree.root());
    assert_eq!(children.len(), 1);
    assert!(matches!(tree.kind(children[0]), NodeKind::Subcommand { .. }));
    assert_eq!(tree.text(children[0]), "A");
    assert!(tree.children(children[0]).is_empty());
}

#[tokio::test]
async fn flag_cluster_yields_sibling_options() {
    let spec = CommandSpec::new("ls")
        .with_option(OptionSpec::new(["-a"]))
        .with_option(OptionSpec::new(["-b"]))
        .with_option(OptionSpec::new(["-c"]))
        .with_subcommand(CommandSpec::new("sub"));
    let ctx = context(StaticRuntime::new());

    let tree = TreeBuilder::new(&ctx)
        .build("ls", Arc::new(spec), &tokens(&["-abc"]))
        .await;

    let children = tree.children(tree.root());
    let texts: Vec<&str> = children.iter().map(|&id| tree.text(id)).collect();
    assert_eq!(texts, vec!["-a", "-b", "-c"]);
    assert!(
        children
            .iter()
            .all(|&id| matches!(tree.kind(id), NodeKind::Option { .. }))
    );
}

#[tokio::test]
async fn used_option_is_not_offered_again() {
    let spec = CommandSpec::new("tool")
        .with_option(OptionSpec::new(["--once"]))
        .with_option(OptionSpec::new(["--many"]).with_repeat_limit(0));
    let engine = engine_for(spec, StaticRuntime::new());

    let before = engine
        .compute_completions("tool", &tokens(&["tool", ""]))
        .await
        .unwrap();
    assert_eq!(names(&before), vec!["--once", "--many"]);

    let after = engine
        .compute_completions("tool", &tokens(&["tool", "--once", "--many", ""]))
        .await
        .unwrap();
    assert_eq!(names(&after), vec!["--many"]);
}

#[tokio::test]
async fn exclusive_option_disappears_after_its_rival() {
    let spec = CommandSpec::new("tool")
        .with_option(OptionSpec::new(["--foo"]))
        .with_option(OptionSpec::new(["--bar"]).exclusive_with(["--foo"]));
    let engine = engine_for(spec, StaticRuntime::new());

    let before = engine
        .compute_completions("tool", &tokens(&["tool", "--"]))
        .await
        .unwrap();
    assert!(names(&before).contains(&"--bar"));

    let after = engine
        .compute_completions("tool", &tokens(&["tool", "--foo", "--"]))
        .await
        .unwrap();
    assert!(!names(&after).contains(&"--bar"));

    // The declaring option rules out the options it names
    let after_bar = engine
        .compute_completions("tool", &tokens(&["tool", "--bar", ""]))
        .await
        .unwrap();
    assert!(!names(&after_bar).contains(&"--foo"));
}

#[tokio::test]
async fn uninterruptible_variadic_keeps_options_away() {
    let spec = CommandSpec::new("xargs")
        .with_option(OptionSpec::new(["-n"]))
        .with_argument(
            ArgumentSpec::new()
                .variadic()
                .uninterruptible()
                .with_suggestions(["echo", "rm"]),
        );
    let engine = engine_for(spec, StaticRuntime::new());

    let suggestions = engine
        .compute_completions("xargs", &tokens(&["xargs", "echo", "rm", ""]))
        .await
        .unwrap();
    assert_eq!(names(&suggestions), vec!["echo", "rm"]);
}

#[tokio::test]
async fn path_suggestions_below_a_directory() {
    let ctx = context(StaticRuntime::new().with_directory("src", ["main.rs", "lib.rs"]));
    let argument = Arc::new(ArgumentSpec::file());

    let suggestions = path_suggestions(&ctx, &argument, "src/", false).await;
    assert_eq!(names(&suggestions), vec!["main.rs", "lib.rs", ""]);
}

#[tokio::test]
async fn path_suggestions_from_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::create_dir(dir.path().join("src/bin")).unwrap();
    std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();

    let runtime = LocalRuntime::new(dir.path());
    let ctx = RequestContext::new(Arc::new(SpecRegistry::new()), Arc::new(runtime));
    let argument = Arc::new(ArgumentSpec::file());

    let suggestions = path_suggestions(&ctx, &argument, "src/ma", false).await;
    assert_eq!(names(&suggestions), vec!["bin/", "main.rs", ""]);

    let folders = path_suggestions(&ctx, &argument, "src/", true).await;
    assert_eq!(names(&folders), vec!["bin/", ""]);
}

#[tokio::test]
async fn dot_slash_lists_the_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();

    let runtime = LocalRuntime::new(dir.path());
    let ctx = RequestContext::new(Arc::new(SpecRegistry::new()), Arc::new(runtime));
    let argument = Arc::new(ArgumentSpec::file());

    let suggestions = path_suggestions(&ctx, &argument, "./", false).await;
    assert_eq!(names(&suggestions), vec!["./", "../", "a.txt"]);
}

#[tokio::test]
async fn unmatched_token_returns_from_optional_option_argument() {
    let spec = CommandSpec::new("ls")
        .with_option(
            OptionSpec::new(["--color"]).with_argument(
                ArgumentSpec::new()
                    .optional()
                    .with_suggestions(["always", "never"]),
            ),
        )
        .with_argument(ArgumentSpec::new().with_suggestions(["foo"]));
    let engine = engine_for(spec, StaticRuntime::new());

    let tree = engine
        .parse("ls", &tokens(&["ls", "--color", "foo", ""]))
        .await
        .unwrap();
    assert_eq!(
        tree.dump(),
        "ls [subcommand] <\n  --color [option]\n  foo [argument]\n"
    );

    let matched = engine
        .parse("ls", &tokens(&["ls", "--color", "never", ""]))
        .await
        .unwrap();
    assert_eq!(
        matched.dump(),
        "ls [subcommand]\n  --color [option] <\n    never [argument]\n"
    );
}

#[tokio::test]
async fn command_without_spec_has_no_opinion() {
    let engine = engine_for(CommandSpec::new("git"), StaticRuntime::new());
    assert!(
        engine
            .compute_completions("hg", &tokens(&["hg"]))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn single_blank_token_means_no_opinion() {
    let engine = engine_for(CommandSpec::new("git"), StaticRuntime::new());
    assert!(
        engine
            .compute_completions("git", &tokens(&[""]))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn alias_and_its_target_collapse_into_one_entry() {
    let ctx = context(StaticRuntime::new().with_environment(ShellEnvironment {
        aliases: vec![ShellAlias::new("top", "top-level-cmd")],
        commands: vec!["top-level-cmd".to_string()],
        ..ShellEnvironment::default()
    }));

    let commands = available_commands(&ctx).await;
    assert_eq!(names(&commands), vec!["top"]);
}

#[tokio::test]
async fn specs_loaded_from_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("git.json"),
        r#"{
            "names": ["git"],
            "subcommands": [
                { "names": ["checkout", "co"], "deferredSpecRef": "git-checkout" },
                { "names": ["status"] }
            ]
        }"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("git-checkout.json"),
        r#"{
            "names": ["checkout"],
            "options": [{ "names": ["-b"], "arguments": [{ "name": "branch" }] }],
            "arguments": [{ "generators": [{ "script": "git branch --format='%(refname:short)'" }] }]
        }"#,
    )
    .unwrap();

    let runtime = StaticRuntime::new()
        .with_generator("git branch --format='%(refname:short)'", ["main", "feature"]);
    let engine = CompletionEngine::new(
        Arc::new(SpecRegistry::with_directory(dir.path())),
        Arc::new(runtime),
    );

    let top = engine
        .compute_completions("git", &tokens(&["git", ""]))
        .await
        .unwrap();
    assert_eq!(names(&top), vec!["checkout", "status"]);

    let branches = engine
        .compute_completions("git", &tokens(&["git", "co", ""]))
        .await
        .unwrap();
    assert_eq!(names(&branches), vec!["-b", "main", "feature"]);

    let tree = engine
        .parse("git", &tokens(&["git", "co", "-b", "topic", ""]))
        .await
        .unwrap();
    assert_eq!(
        tree.dump(),
        "git [subcommand]\n  co [subcommand]\n    -b [option] <\n      topic [argument]\n"
    );
}
