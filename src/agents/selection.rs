use crate::error::{BrewupError, Result};
use crate::package::Package;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// A single answer at the selection prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Answer {
    Confirm,
    Toggle(Vec<usize>),
    All,
    Clear,
    Quit,
}

fn parse_answer(input: &str, len: usize) -> std::result::Result<Answer, String> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "" => return Ok(Answer::Confirm),
        "a" | "all" => return Ok(Answer::All),
        "n" | "none" => return Ok(Answer::Clear),
        "q" | "quit" => return Ok(Answer::Quit),
        _ => {}
    }

    let mut indices = Vec::new();
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let (start, end) = match token.split_once('-') {
            Some((start, end)) => (parse_index(start, len)?, parse_index(end, len)?),
            None => {
                let index = parse_index(token, len)?;
                (index, index)
            }
        };
        if start > end {
            return Err(format!("'{token}' is not a valid range"));
        }
        indices.extend(start..=end);
    }

    Ok(Answer::Toggle(indices))
}

fn parse_index(token: &str, len: usize) -> std::result::Result<usize, String> {
    match token.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(format!("'{token}' is not a number between 1 and {len}")),
    }
}

/// Lets the user pick which packages are upgraded.
///
/// Every package starts checked; the user toggles entries by number until they
/// confirm with an empty line.
pub struct PackageSelector<R, W> {
    input: R,
    output: W,
}

impl PackageSelector<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PackageSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Return the packages to upgrade. With `select_all` no prompt is shown.
    pub fn choose(&mut self, packages: Vec<Package>, select_all: bool) -> Result<Vec<Package>> {
        if select_all || packages.is_empty() {
            return Ok(packages);
        }

        let mut checked = vec![true; packages.len()];
        writeln!(self.output, "\n{}", "Unselect packages for upgrade".bold())?;

        loop {
            self.render(&packages, &checked)?;
            write!(
                self.output,
                "{}",
                "Toggle by number (e.g. 1 3-5), [a]ll, [n]one, [q]uit, Enter to confirm: ".bold()
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Err(BrewupError::UserCancelled);
            }

            match parse_answer(&line, packages.len()) {
                Ok(Answer::Confirm) => break,
                Ok(Answer::All) => checked.iter_mut().for_each(|c| *c = true),
                Ok(Answer::Clear) => checked.iter_mut().for_each(|c| *c = false),
                Ok(Answer::Quit) => {
                    writeln!(self.output, "{}", "Stopping at user request.".yellow())?;
                    return Err(BrewupError::UserCancelled);
                }
                Ok(Answer::Toggle(indices)) => {
                    for index in indices {
                        checked[index] = !checked[index];
                    }
                }
                Err(message) => writeln!(self.output, "{}", message.red())?,
            }
        }

        let selected: Vec<Package> = packages
            .into_iter()
            .zip(checked)
            .filter_map(|(package, keep)| keep.then_some(package))
            .collect();

        tracing::debug!("{} package(s) selected", selected.len());
        Ok(selected)
    }

    fn render(&mut self, packages: &[Package], checked: &[bool]) -> Result<()> {
        for (index, (package, &on)) in packages.iter().zip(checked).enumerate() {
            let mark = if on { "[x]".green().bold() } else { "[ ]".dimmed() };
            writeln!(
                self.output,
                "  {} {:>2}. {} {} → {}",
                mark,
                index + 1,
                package.name.white().bold(),
                package.installed_version().red(),
                package.current.as_deref().unwrap_or("").green()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageType;
    use std::io::Cursor;

    fn packages() -> Vec<Package> {
        ["dav1d", "gping", "fork"]
            .iter()
            .map(|name| {
                Package::new(*name)
                    .with_type(PackageType::Formula)
                    .with_versions(vec!["1.0".into()], Some("2.0".into()))
            })
            .collect()
    }

    fn choose(input: &str, select_all: bool) -> (Result<Vec<Package>>, String) {
        let mut output = Vec::new();
        let result = PackageSelector::new(Cursor::new(input.to_string()), &mut output)
            .choose(packages(), select_all);
        (result, String::from_utf8(output).unwrap())
    }

    fn names(result: Result<Vec<Package>>) -> Vec<String> {
        result.unwrap().into_iter().map(|p| p.name).collect()
    }

    #[test]
    fn select_all_skips_prompt() {
        let (result, output) = choose("", true);
        assert_eq!(names(result), vec!["dav1d", "gping", "fork"]);
        assert!(output.is_empty());
    }

    #[test]
    fn enter_keeps_everything_checked() {
        let (result, output) = choose("\n", false);
        assert_eq!(names(result), vec!["dav1d", "gping", "fork"]);
        assert!(output.contains("Unselect packages for upgrade"));
        assert!(output.contains("gping"));
    }

    #[test]
    fn toggling_removes_packages() {
        let (result, _) = choose("2\n\n", false);
        assert_eq!(names(result), vec!["dav1d", "fork"]);
    }

    #[test]
    fn ranges_and_commas_are_accepted() {
        let (result, _) = choose("1-2,3\n3\n\n", false);
        assert_eq!(names(result), vec!["fork"]);
    }

    #[test]
    fn none_then_confirm_selects_nothing() {
        let (result, _) = choose("n\n\n", false);
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn quit_cancels() {
        let (result, _) = choose("q\n", false);
        assert!(matches!(result, Err(BrewupError::UserCancelled)));
    }

    #[test]
    fn end_of_input_cancels() {
        let (result, _) = choose("", false);
        assert!(matches!(result, Err(BrewupError::UserCancelled)));
    }

    #[test]
    fn invalid_input_reprompts() {
        let (result, output) = choose("9\nx\n\n", false);
        assert_eq!(names(result), vec!["dav1d", "gping", "fork"]);
        assert!(output.contains("'9' is not a number between 1 and 3"));
        assert!(output.contains("'x' is not a number between 1 and 3"));
    }

    #[test]
    fn parse_answer_rejects_reversed_range() {
        assert!(parse_answer("3-1", 3).is_err());
        assert_eq!(parse_answer(" A ", 3), Ok(Answer::All));
        assert_eq!(parse_answer("1 3", 3), Ok(Answer::Toggle(vec![0, 2])));
    }
}
