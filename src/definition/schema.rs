//! Definition validation
//!
//! This module checks the structural rules every definition must satisfy
//! before a generator may consume it.

use crate::definition::types::CommandDefinition;
use crate::error::{DefinitionError, DefinitionResult};
use regex::Regex;
use std::collections::HashSet;

const SPELLING_PATTERN: &str = r"^--?[A-Za-z0-9?][A-Za-z0-9_.-]*$";
const NAME_PATTERN: &str = r"^[A-Za-z0-9_][A-Za-z0-9_.:-]*$";

/// Validate a complete definition tree
pub fn validate_definition(definition: &CommandDefinition) -> DefinitionResult<()> {
    let spelling_re = Regex::new(SPELLING_PATTERN).expect("valid spelling pattern");
    let name_re = Regex::new(NAME_PATTERN).expect("valid name pattern");

    if definition.name.is_empty() {
        return Err(DefinitionError::EmptyName);
    }

    validate_level(definition, &spelling_re, &name_re)
}

/// Validate one level and recurse into its subcommands
fn validate_level(
    definition: &CommandDefinition,
    spelling_re: &Regex,
    name_re: &Regex,
) -> DefinitionResult<()> {
    let command = definition.name.clone();

    // Spellings are unique across flag and value options
    let mut seen = HashSet::new();
    for option in &definition.options {
        if option.flags.is_empty() {
            return Err(DefinitionError::NoSpellings(command));
        }
        for spelling in &option.flags {
            if !spelling_re.is_match(spelling) {
                return Err(DefinitionError::InvalidSpelling {
                    command,
                    spelling: spelling.clone(),
                });
            }
            if !seen.insert(spelling.as_str()) {
                return Err(DefinitionError::DuplicateSpelling {
                    command,
                    spelling: spelling.clone(),
                });
            }
        }
    }

    for positional in &definition.positionals {
        if positional.name.trim().is_empty() {
            return Err(DefinitionError::InvalidPositional {
                command,
                name: positional.name.clone(),
            });
        }
    }

    for group in &definition.exclusive {
        for spelling in group {
            if !seen.contains(spelling.as_str()) {
                return Err(DefinitionError::UnknownExclusiveMember {
                    command,
                    spelling: spelling.clone(),
                });
            }
        }
    }

    if definition.has_subcommands() && !definition.positionals.is_empty() {
        return Err(DefinitionError::PositionalsWithSubcommands(command));
    }

    let mut names = HashSet::new();
    for sub in &definition.subcommands {
        if !name_re.is_match(&sub.name) {
            return Err(DefinitionError::InvalidSubcommand {
                command,
                name: sub.name.clone(),
            });
        }
        if !names.insert(sub.name.as_str()) {
            return Err(DefinitionError::DuplicateSubcommand {
                command,
                name: sub.name.clone(),
            });
        }
        validate_level(sub, spelling_re, name_re)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::types::{OptionSpec, Positional};

    #[test]
    fn test_validate_valid_definition() {
        let def = CommandDefinition::new("tool")
            .option(OptionSpec::flag(["-v", "--verbose"]))
            .option(OptionSpec::value(["--output"]))
            .subcommand(
                CommandDefinition::new("build")
                    .positional(Positional::new("target").choices(["debug", "release"])),
            );
        assert!(validate_definition(&def).is_ok());
    }

    #[test]
    fn test_validate_empty_name() {
        let def = CommandDefinition::default();
        assert!(matches!(
            validate_definition(&def),
            Err(DefinitionError::EmptyName)
        ));
    }

    #[test]
    fn test_validate_duplicate_spelling_across_kinds() {
        let def = CommandDefinition::new("tool")
            .option(OptionSpec::flag(["-o"]))
            .option(OptionSpec::value(["-o", "--output"]));
        assert!(matches!(
            validate_definition(&def),
            Err(DefinitionError::DuplicateSpelling { .. })
        ));
    }

    #[test]
    fn test_validate_invalid_spelling() {
        for bad in ["verbose", "---x", "--has space", "-"] {
            let def = CommandDefinition::new("tool").option(OptionSpec::flag([bad]));
            assert!(
                matches!(
                    validate_definition(&def),
                    Err(DefinitionError::InvalidSpelling { .. })
                ),
                "accepted spelling: {}",
                bad
            );
        }
    }

    #[test]
    fn test_validate_option_without_spellings() {
        let def = CommandDefinition::new("tool").option(OptionSpec::default());
        assert!(matches!(
            validate_definition(&def),
            Err(DefinitionError::NoSpellings(_))
        ));
    }

    #[test]
    fn test_validate_unknown_exclusive_member() {
        let def = CommandDefinition::new("tool")
            .option(OptionSpec::flag(["--json"]))
            .exclusive(["--json", "--yaml"]);
        assert!(matches!(
            validate_definition(&def),
            Err(DefinitionError::UnknownExclusiveMember { .. })
        ));
    }

    #[test]
    fn test_validate_positionals_with_subcommands() {
        let def = CommandDefinition::new("tool")
            .positional(Positional::new("file"))
            .subcommand(CommandDefinition::new("build"));
        assert!(matches!(
            validate_definition(&def),
            Err(DefinitionError::PositionalsWithSubcommands(_))
        ));
    }

    #[test]
    fn test_validate_nested_duplicate_subcommand() {
        let def = CommandDefinition::new("tool").subcommand(
            CommandDefinition::new("remote")
                .subcommand(CommandDefinition::new("add"))
                .subcommand(CommandDefinition::new("add")),
        );
        assert!(matches!(
            validate_definition(&def),
            Err(DefinitionError::DuplicateSubcommand { .. })
        ));
    }

    #[test]
    fn test_validate_invalid_subcommand_name() {
        let def = CommandDefinition::new("tool").subcommand(CommandDefinition::new("two words"));
        assert!(matches!(
            validate_definition(&def),
            Err(DefinitionError::InvalidSubcommand { .. })
        ));
    }
}
