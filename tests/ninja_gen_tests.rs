//! Tests for rendering build files to Ninja syntax.

use anyhow::{Context, Result, ensure};
use ninja_synth::command::{Arg, CommandLine, Commands, Tool};
use ninja_synth::ir::{BuildEdge, CommandBuild, RuleOptions, Section, Value, Variable};
use ninja_synth::ninja_gen::{WriteError, generate};
use ninja_synth::path::{BuildPath, InstallRoot};
use ninja_synth::platform::Platform;
use ninja_synth::safe_str::Fragment;
use rstest::rstest;
use test_support::{build_file_for, command_line, override_line};

fn var(name: &str) -> Fragment {
    Variable::new(name).use_var()
}

fn two_lines_with_env() -> Commands {
    Commands::new(CommandLine::args(["echo", "a"]))
        .then(CommandLine::args(["touch", "b c"]))
        .env("FOO", "bar")
}

#[rstest]
fn rule_block_precedes_edge_separated_by_one_blank_line() -> Result<()> {
    let mut file = build_file_for(Platform::Linux);
    let line = CommandLine::args([
        Fragment::plain("cc"),
        Fragment::plain("-c"),
        var("in"),
        Fragment::plain("-o"),
        var("out"),
    ]);
    file.rule("cc", line, RuleOptions::default())?;
    file.build(BuildEdge::new(["main.o"], "cc").with_inputs(["main.c"]))?;

    let ninja = generate(&file)?;
    ensure!(
        ninja.contains("rule cc\n  command = cc -c ${in} -o ${out}\n\nbuild main.o: cc main.c\n"),
        "unexpected output:\n{ninja}"
    );
    Ok(())
}

#[rstest]
#[case(Platform::Windows, "cmd /s /c \"export FOO=bar && echo a && touch 'b c'\"")]
#[case(Platform::Linux, "export FOO=bar && echo a && touch 'b c'")]
#[case(Platform::Darwin, "export FOO=bar && echo a && touch 'b c'")]
fn shell_sequences_are_wrapped_only_on_windows(
    #[case] platform: Platform,
    #[case] expected: &str,
) -> Result<()> {
    let commands = two_lines_with_env();
    ensure!(commands.needs_shell(), "sequence should need a shell");

    let mut file = build_file_for(platform);
    file.rule("multi", commands, RuleOptions::default())?;
    let ninja = generate(&file)?;
    let command = command_line(&ninja, "multi").context("multi rule present")?;
    ensure!(command == expected, "got {command}");
    Ok(())
}

#[rstest]
fn direct_commands_are_never_wrapped() -> Result<()> {
    let mut file = build_file_for(Platform::Windows);
    file.rule(
        "copy",
        CommandLine::args(["copy", "a file", "b"]),
        RuleOptions::default(),
    )?;
    let ninja = generate(&file)?;
    ensure!(command_line(&ninja, "copy") == Some("copy 'a file' b"));
    Ok(())
}

#[rstest]
fn shell_operators_stay_unquoted() -> Result<()> {
    let mut file = build_file_for(Platform::Linux);
    let line = CommandLine::shell_list([
        Arg::from("cat"),
        Arg::from(var("in")),
        Arg::from(Fragment::shell_literal(">")),
        Arg::from(var("out")),
    ]);
    file.rule("cat", line, RuleOptions::default())?;
    let ninja = generate(&file)?;
    ensure!(command_line(&ninja, "cat") == Some("cat ${in} > ${out}"));
    Ok(())
}

#[rstest]
fn collapsed_rule_with_shell_override_keeps_override_envelope() -> Result<()> {
    let mut file = build_file_for(Platform::Windows);
    let redirect = Commands::new(CommandLine::shell_list([
        Arg::from("echo"),
        Arg::from("done"),
        Arg::from(Fragment::shell_literal(">")),
        Arg::from("log.txt"),
    ]));
    file.command_build(CommandBuild::new(["log"], redirect))?;
    file.command_build(CommandBuild::new(
        ["hello"],
        Commands::new(CommandLine::args(["echo", "hi"])),
    ))?;

    let ninja = generate(&file)?;
    ensure!(
        command_line(&ninja, "console_command") == Some("${cmd}"),
        "shared rule must stay a bare reference:\n{ninja}"
    );
    ensure!(
        override_line(&ninja, "build log:", "cmd") == Some("cmd /s /c \"echo done > log.txt\""),
        "override must carry its own envelope:\n{ninja}"
    );
    ensure!(
        override_line(&ninja, "build hello:", "cmd") == Some("echo hi"),
        "direct override must stay bare:\n{ninja}"
    );
    Ok(())
}

#[rstest]
fn edge_lines_escape_each_position() -> Result<()> {
    let mut file = build_file_for(Platform::Linux);
    file.rule("cc", Commands::from(Variable::new("cmd")), RuleOptions::default())?;
    let edge = BuildEdge::new(["out dir/a:b.o"], "cc")
        .with_inputs(["in file.c"])
        .with_implicit(["c:/hdr.h"])
        .with_order_only(["gen"])
        .with_variable("cflags", Value::words(["-O2", "-DNAME=a b"]));
    file.build(edge)?;

    let ninja = generate(&file)?;
    ensure!(
        ninja.contains(
            "build out$ dir/a$:b.o: cc in$ file.c | c:/hdr.h || gen\n  cflags = -O2 '-DNAME=a b'\n\n"
        ),
        "unexpected edge:\n{ninja}"
    );
    Ok(())
}

#[rstest]
fn path_section_values_are_not_shell_quoted() -> Result<()> {
    let mut file = build_file_for(Platform::Linux);
    let bindir = BuildPath::install(InstallRoot::Prefix, "bin").without_destdir();
    file.variable("bindir", bindir.clone(), Section::Path, false)?;
    file.variable("tooldir", bindir, Section::Other, false)?;

    let ninja = generate(&file)?;
    ensure!(
        ninja.contains("bindir = ${prefix}/bin\n\ntooldir = '${prefix}/bin'\n\n"),
        "unexpected variables:\n{ninja}"
    );
    Ok(())
}

#[rstest]
fn sections_are_emitted_in_fixed_order() -> Result<()> {
    let mut file = build_file_for(Platform::Linux);
    file.variable("extra", "1", Section::Other, false)?;
    file.variable("cflags", "-g", Section::Flags, false)?;
    file.variable("cc", "gcc", Section::Command, false)?;
    file.variable("srcdir", "..", Section::Path, false)?;

    let ninja = generate(&file)?;
    ensure!(
        ninja.ends_with("srcdir = ..\n\ncc = gcc\n\ncflags = -g\n\nextra = 1\n\n"),
        "unexpected order:\n{ninja}"
    );
    Ok(())
}

#[rstest]
fn defaults_are_written_once_with_repeats() -> Result<()> {
    let mut file = build_file_for(Platform::Linux);
    file.build(BuildEdge::phony(["a b"]))?;
    file.default(["a b"])?;
    file.default(["a b"])?;
    let ninja = generate(&file)?;
    ensure!(
        ninja.ends_with("build a$ b: phony\n\ndefault a$ b a$ b\n"),
        "unexpected tail:\n{ninja}"
    );
    Ok(())
}

#[rstest]
fn dollar_signs_in_plain_text_are_doubled() -> Result<()> {
    let mut file = build_file_for(Platform::Linux);
    file.variable("price", "$5", Section::Other, false)?;
    let ninja = generate(&file)?;
    ensure!(ninja.contains("price = $$5\n"), "unexpected:\n{ninja}");
    Ok(())
}

#[rstest]
fn unconverted_tools_in_variables_fail_to_render() -> Result<()> {
    let mut file = build_file_for(Platform::Linux);
    file.variable(
        "linker",
        Value::words([Arg::from(Tool::new("ld", "ld"))]),
        Section::Other,
        false,
    )?;
    let err = generate(&file).err().context("render should fail")?;
    ensure!(matches!(err, WriteError::TypeMismatch { .. }), "got {err}");
    Ok(())
}
