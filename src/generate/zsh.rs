//! Zsh completion generator
//!
//! Each level becomes one `_arguments -C` function. Levels with subcommands
//! move through two states: `subcmd` while the subcommand word is being
//! completed, then `args`, where completion is handed to the function of
//! the chosen subcommand.

use crate::definition::{CommandDefinition, OptionSpec};
use crate::generate::{ident, nested_function, quote_escape, single_quote, FunctionNames};

/// Generate a complete zsh completion script for `prog_name`
pub fn generate(definition: &CommandDefinition, prog_name: &str) -> String {
    generate_function(definition, Some(prog_name), 0)
}

/// Generate the function `_<prog_name>` completing `definition` at `level`,
/// preceded by the functions of its subcommands.
///
/// `prog_name` defaults to the definition's name. At level 0 the result is
/// wrapped in the `#compdef` header and `compdef` registration.
pub fn generate_function(
    definition: &CommandDefinition,
    prog_name: Option<&str>,
    level: usize,
) -> String {
    let prog_name = prog_name.unwrap_or(definition.name.as_str());
    let mut names = FunctionNames::default();
    let func_name = names.claim(format!("_{}", ident(prog_name)));

    let mut sections = Vec::new();
    if level == 0 {
        sections.push(format!("#compdef {}", prog_name));
    }
    sections.push(render(definition, &func_name, &mut names));
    if level == 0 {
        sections.push(format!("compdef {} {}\n", func_name, prog_name));
    }
    sections.join("\n\n")
}

fn render(
    definition: &CommandDefinition,
    func_name: &str,
    names: &mut FunctionNames,
) -> String {
    let mut sections = Vec::new();
    let mut sub_funcs = Vec::new();
    for sub in &definition.subcommands {
        let sub_func = names.claim(nested_function(func_name, &sub.name));
        sections.push(render(sub, &sub_func, names));
        sub_funcs.push(sub_func);
    }

    sections.push(function_body(definition, func_name, &sub_funcs));
    sections.join("\n\n")
}

fn function_body(
    definition: &CommandDefinition,
    func_name: &str,
    sub_funcs: &[String],
) -> String {
    let mut lines = vec![
        format!("{}() {{", func_name),
        "  local context state state_descr line".to_string(),
        "  typeset -A opt_args".to_string(),
        String::new(),
    ];

    let specs = argument_specs(definition);
    if specs.is_empty() {
        lines.push("  _arguments -C".to_string());
    } else {
        lines.push("  _arguments -C \\".to_string());
        let last = specs.len() - 1;
        for (i, spec) in specs.iter().enumerate() {
            let cont = if i == last { "" } else { " \\" };
            lines.push(format!("    {}{}", spec, cont));
        }
    }

    if definition.has_subcommands() {
        lines.extend(state_dispatch(definition, sub_funcs));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

/// `_arguments` specs: exclusive options, remaining options, positionals,
/// then the subcommand states
fn argument_specs(definition: &CommandDefinition) -> Vec<String> {
    let mut specs = Vec::new();
    let mut emitted: Vec<&OptionSpec> = Vec::new();

    for group in definition.exclusive_groups() {
        for option in group {
            if emitted.iter().any(|o| std::ptr::eq(*o, option)) {
                continue;
            }
            specs.push(option_spec(option, &exclusion_list(definition, option)));
            emitted.push(option);
        }
    }

    for option in &definition.options {
        if emitted.iter().any(|o| std::ptr::eq(*o, option)) {
            continue;
        }
        specs.push(option_spec(option, &[]));
    }

    for (i, positional) in definition.positionals.iter().enumerate() {
        let action = match &positional.choices {
            Some(choices) => format!(
                "({})",
                choices
                    .iter()
                    .map(|c| quote_escape(&c.replace(' ', r"\ ")))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            None => "_files".to_string(),
        };
        specs.push(format!(
            "'{}:{}:{}'",
            i + 1,
            quote_escape(&colon_escape(&positional.name)),
            action
        ));
    }

    if definition.has_subcommands() {
        specs.push("'1: :->subcmd'".to_string());
        specs.push("'*:: :->args'".to_string());
    }

    specs
}

/// Spellings excluded once `option` is present: every spelling of every
/// group it belongs to, in declaration order
fn exclusion_list<'a>(definition: &'a CommandDefinition, option: &OptionSpec) -> Vec<&'a str> {
    let mut excluded: Vec<&str> = Vec::new();
    for group in definition.exclusive_groups() {
        if !group.iter().any(|o| std::ptr::eq(*o, option)) {
            continue;
        }
        for member in group {
            for spelling in &member.flags {
                if !excluded.contains(&spelling.as_str()) {
                    excluded.push(spelling);
                }
            }
        }
    }
    excluded
}

/// One option spec, e.g. `'(--json --yaml)'{'-j','--json'}'[Emit JSON]'`
fn option_spec(option: &OptionSpec, exclusion: &[&str]) -> String {
    let help = help_escape(option.help.as_deref().unwrap_or_default());
    let mut rest = format!("[{}]", help);
    if option.takes_value() {
        rest.push_str(&format!(
            ":{}:_files",
            quote_escape(&colon_escape(&option.value_label()))
        ));
    }

    let marker = if exclusion.is_empty() {
        String::new()
    } else {
        format!("({})", exclusion.join(" "))
    };

    if option.flags.len() == 1 {
        format!("'{}{}{}'", marker, option.flags[0], rest)
    } else {
        let quoted: Vec<String> = option.flags.iter().map(|f| single_quote(f)).collect();
        let alternation = format!("{{{}}}", quoted.join(","));
        if marker.is_empty() {
            format!("{}'{}'", alternation, rest)
        } else {
            format!("'{}'{}'{}'", marker, alternation, rest)
        }
    }
}

fn state_dispatch(definition: &CommandDefinition, sub_funcs: &[String]) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "  local -a subcommands".to_string(),
        "  subcommands=(".to_string(),
    ];

    for sub in &definition.subcommands {
        let name = quote_escape(&colon_escape(&sub.name));
        match &sub.about {
            Some(about) => lines.push(format!("    '{}:{}'", name, quote_escape(about))),
            None => lines.push(format!("    '{}'", name)),
        }
    }

    lines.extend([
        "  )".to_string(),
        String::new(),
        "  case $state in".to_string(),
        "    subcmd)".to_string(),
        "      _describe 'command' subcommands".to_string(),
        "      ;;".to_string(),
        "    args)".to_string(),
        "      case $words[1] in".to_string(),
    ]);

    for (sub, sub_func) in definition.subcommands.iter().zip(sub_funcs) {
        lines.push(format!("        {})", sub.name));
        lines.push(format!("          {}", sub_func));
        lines.push("          ;;".to_string());
    }

    lines.extend([
        "      esac".to_string(),
        "      ;;".to_string(),
        "  esac".to_string(),
    ]);
    lines
}

/// Escape a description placed between `[` and `]` of a quoted spec
fn help_escape(s: &str) -> String {
    quote_escape(&s.replace('[', r"\[").replace(']', r"\]"))
}

fn colon_escape(s: &str) -> String {
    s.replace(':', r"\:")
}
