//! Bash completion generator
//!
//! Each level becomes one function driven by `COMP_WORDS`/`COMP_CWORD`.
//! Levels with subcommands offer the subcommand names (plus flags) right
//! after their own token and otherwise dispatch on the token at their
//! position; leaf levels offer options and positional choices through
//! `compgen -W`.

use crate::definition::CommandDefinition;
use crate::generate::{ident, nested_function, single_quote, FunctionNames};

const INDENT: &str = "    ";

/// Generate a complete bash completion script for `prog_name`
pub fn generate(definition: &CommandDefinition, prog_name: &str) -> String {
    let mut script = generate_function(definition, prog_name, None, 0);
    script.push('\n');
    script
}

/// Generate the function completing `definition` at `level`, preceded by
/// the functions of its subcommands.
///
/// `function_name` defaults to `_<prog_name>`. At level 0 the result ends
/// with the `complete -F` registration.
pub fn generate_function(
    definition: &CommandDefinition,
    prog_name: &str,
    function_name: Option<&str>,
    level: usize,
) -> String {
    let mut names = FunctionNames::default();
    let func_name = names.claim(
        function_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("_{}", ident(prog_name))),
    );
    render(definition, prog_name, &func_name, level, &mut names)
}

fn render(
    definition: &CommandDefinition,
    prog_name: &str,
    func_name: &str,
    level: usize,
    names: &mut FunctionNames,
) -> String {
    let mut functions = Vec::new();
    let mut sub_funcs = Vec::new();
    for sub in &definition.subcommands {
        let sub_func = names.claim(nested_function(func_name, &sub.name));
        functions.push(render(sub, prog_name, &sub_func, level + 1, names));
        sub_funcs.push(sub_func);
    }

    let mut script = vec![format!("{}() {{", func_name)];
    script.extend(preamble());

    if definition.has_subcommands() {
        script.extend(dispatch_body(definition, &sub_funcs, level));
    } else {
        script.extend(leaf_body(definition));
    }
    script.push("}".to_string());

    if level == 0 {
        script.push(String::new());
        script.push(format!("complete -F {} {}", func_name, prog_name));
    }

    functions.push(script.join("\n"));
    functions.join("\n\n")
}

/// Standard completion locals
fn preamble() -> Vec<String> {
    [
        "local cur prev words cword",
        "cur=\"${COMP_WORDS[COMP_CWORD]}\"",
        "prev=\"${COMP_WORDS[COMP_CWORD-1]}\"",
        "words=(\"${COMP_WORDS[@]}\")",
        "cword=$COMP_CWORD",
        "COMPREPLY=()",
    ]
    .iter()
    .map(|line| format!("{}{}", INDENT, line))
    .collect()
}

/// `COMPREPLY` filled line by line so candidates are never globbed
fn reply(words: &str) -> String {
    format!("mapfile -t COMPREPLY < <(compgen {} -- \"$cur\")", words)
}

fn dispatch_body(
    definition: &CommandDefinition,
    sub_funcs: &[String],
    level: usize,
) -> Vec<String> {
    let position = level + 1;
    let subcmds: Vec<&str> = definition.subcommands.iter().map(|s| s.name.as_str()).collect();
    let flags: Vec<&str> = definition.flag_options().collect();

    let mut candidates = String::from("$subcmds");
    if !flags.is_empty() {
        candidates.push(' ');
        candidates.push_str(&flags.join(" "));
    }

    let mut body = vec![
        String::new(),
        format!("{}local subcmds=\"{}\"", INDENT, subcmds.join(" ")),
        format!("{}if [ \"$COMP_CWORD\" -eq {} ]; then", INDENT, position),
        format!("{0}{0}{1}", INDENT, reply(&format!("-W \"{}\"", candidates))),
        format!("{0}{0}return 0", INDENT),
        format!("{}fi", INDENT),
        String::new(),
        format!("{}case \"${{COMP_WORDS[{}]}}\" in", INDENT, position),
    ];

    for (sub, sub_func) in definition.subcommands.iter().zip(sub_funcs) {
        body.push(format!("{0}{0}{1})", INDENT, sub.name));
        body.push(format!("{0}{0}{0}{1}", INDENT, sub_func));
        body.push(format!("{0}{0}{0};;", INDENT));
    }

    body.push(format!("{}esac", INDENT));
    body.push(format!("{}return 0", INDENT));
    body
}

fn leaf_body(definition: &CommandDefinition) -> Vec<String> {
    let mut body = Vec::new();

    // A value option just typed: complete its argument as a path
    let value_opts: Vec<&str> = definition.value_options().collect();
    if !value_opts.is_empty() {
        body.push(String::new());
        body.push(format!("{}case \"$prev\" in", INDENT));
        let patterns: Vec<String> = value_opts.iter().map(|o| single_quote(o)).collect();
        body.push(format!("{0}{0}{1})", INDENT, patterns.join("|")));
        body.push(format!("{0}{0}{0}{1}", INDENT, reply("-f")));
        body.push(format!("{0}{0}{0}return 0", INDENT));
        body.push(format!("{0}{0}{0};;", INDENT));
        body.push(format!("{}esac", INDENT));
    }

    // Flags are offered until they have been typed once
    let flags: Vec<&str> = definition.flag_options().collect();
    body.push(String::new());
    let quoted: Vec<String> = flags.iter().map(|f| single_quote(f)).collect();
    body.push(format!("{}local opts_flag=({})", INDENT, quoted.join(" ")));
    if !flags.is_empty() {
        body.push(format!("{}local w i", INDENT));
        body.push(format!(
            "{}for w in \"${{COMP_WORDS[@]:0:COMP_CWORD}}\"; do",
            INDENT
        ));
        body.push(format!("{0}{0}for i in \"${{!opts_flag[@]}}\"; do", INDENT));
        body.push(format!(
            "{0}{0}{0}[[ \"${{opts_flag[i]}}\" == \"$w\" ]] && unset 'opts_flag[i]'",
            INDENT
        ));
        body.push(format!("{0}{0}done", INDENT));
        body.push(format!("{}done", INDENT));
    }

    // Value options are offered on every pass
    body.push(format!(
        "{}local opts_store=\"{}\"",
        INDENT,
        value_opts.join(" ")
    ));

    let choices = positional_choices(definition);
    body.push(format!(
        "{}local choices=\"{}\"",
        INDENT,
        choices
            .iter()
            .map(|c| double_quote_escape(c))
            .collect::<Vec<_>>()
            .join(" ")
    ));

    body.push(format!(
        "{}{}",
        INDENT,
        reply("-W \"${opts_flag[*]} $opts_store $choices\"")
    ));
    body.push(format!("{}return 0", INDENT));
    body
}

/// Allowed values of every constrained positional, first occurrence wins
fn positional_choices(definition: &CommandDefinition) -> Vec<&str> {
    let mut choices: Vec<&str> = Vec::new();
    for positional in &definition.positionals {
        for choice in positional.choices.iter().flatten() {
            if !choices.contains(&choice.as_str()) {
                choices.push(choice);
            }
        }
    }
    choices
}

/// Escape text placed inside a double-quoted bash word
fn double_quote_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
