use std::io::{self, BufRead, Write};

use colored::Colorize;

/// Read one trimmed line from stdin. Returns None at end of input.
fn read_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn print_choices(message: &str, choices: &[String], default: Option<&str>) {
    println!("{}", message.bold());
    for (i, choice) in choices.iter().enumerate() {
        if Some(choice.as_str()) == default {
            println!("  {}. {} {}", i + 1, choice, "(default)".dimmed());
        } else {
            println!("  {}. {}", i + 1, choice);
        }
    }
}

/// Single-choice picker: prints numbered choices and reads an index.
/// An empty line picks the default; None means the selection was aborted
/// (end of input, or empty with no default).
pub fn select_one(
    message: &str,
    choices: &[String],
    default: Option<&str>,
) -> io::Result<Option<String>> {
    print_choices(message, choices, default);

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(input) = read_line()? else {
            return Ok(None);
        };
        if input.is_empty() {
            return Ok(default.map(str::to_string));
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=choices.len()).contains(&n) => return Ok(Some(choices[n - 1].clone())),
            _ => println!(
                "{}",
                format!("Enter a number between 1 and {}", choices.len()).yellow()
            ),
        }
    }
}

/// Multi-choice picker reading comma-separated indices. An empty line picks
/// the default choice; end of input returns an empty selection.
pub fn select_many(message: &str, choices: &[String], default: &str) -> io::Result<Vec<String>> {
    print_choices(message, choices, Some(default));
    println!("{}", "Comma-separated numbers, empty line for default".dimmed());

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(input) = read_line()? else {
            return Ok(Vec::new());
        };
        if input.is_empty() {
            return Ok(vec![default.to_string()]);
        }

        match parse_selection(&input, choices) {
            Some(picked) => return Ok(picked),
            None => println!(
                "{}",
                format!(
                    "Enter comma-separated numbers between 1 and {}",
                    choices.len()
                )
                .yellow()
            ),
        }
    }
}

fn parse_selection(input: &str, choices: &[String]) -> Option<Vec<String>> {
    let mut picked = Vec::new();
    for part in input.split(',') {
        let n = part.trim().parse::<usize>().ok()?;
        if !(1..=choices.len()).contains(&n) {
            return None;
        }
        let choice = choices[n - 1].clone();
        if !picked.contains(&choice) {
            picked.push(choice);
        }
    }
    if picked.is_empty() {
        None
    } else {
        Some(picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_selection_valid() {
        let options = choices(&["ALL", "DRAFT", "READY"]);
        assert_eq!(
            parse_selection("2, 3", &options),
            Some(vec!["DRAFT".to_string(), "READY".to_string()])
        );
    }

    #[test]
    fn test_parse_selection_deduplicates() {
        let options = choices(&["ALL", "DRAFT"]);
        assert_eq!(
            parse_selection("2,2,2", &options),
            Some(vec!["DRAFT".to_string()])
        );
    }

    #[test]
    fn test_parse_selection_rejects_out_of_range() {
        let options = choices(&["ALL", "DRAFT"]);
        assert_eq!(parse_selection("3", &options), None);
        assert_eq!(parse_selection("0", &options), None);
    }

    #[test]
    fn test_parse_selection_rejects_garbage() {
        let options = choices(&["ALL"]);
        assert_eq!(parse_selection("first", &options), None);
        assert_eq!(parse_selection("1,x", &options), None);
    }
}
