//! The numbered action menu.

use std::io::{self, BufRead, Write};

/// The action list, one `{index:>3}: {name}` line per action.
pub fn render(names: &[&str]) -> String {
    let mut listing = String::from("ACTIONS:\n");
    for (i, name) in names.iter().enumerate() {
        listing.push_str(&format!("{i:>3}: {name}\n"));
    }
    listing
}

/// Parse a menu entry; `None` unless it names one of `count` actions.
pub fn parse_choice(input: &str, count: usize) -> Option<usize> {
    input.trim().parse::<usize>().ok().filter(|&i| i < count)
}

/// Prompt until a valid action number is entered.
///
/// Returns `None` if the input ends first.
pub fn choose<R: BufRead, W: Write>(input: &mut R, output: &mut W, count: usize) -> io::Result<Option<usize>> {
    write!(output, "Choose action (enter #): ")?;
    loop {
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if let Some(choice) = parse_choice(&line, count) {
            return Ok(Some(choice));
        }

        write!(output, "Enter valid action number: ")?;
    }
}

/// The framed title printed before an action runs.
pub fn banner(name: &str) -> String {
    let separator = "*".repeat(name.len() + 8);
    format!("\n{separator}\n*** {name} ***\n{separator}\n\n")
}
