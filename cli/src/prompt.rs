use std::io::{self, Write};

use netgauge_sampler::{Result, SamplerError};

/// Read one trimmed line from stdin after printing `question`.
pub fn prompt_line(question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}

/// Resolve a value from an optional CLI argument, falling back to an
/// interactive prompt. With prompting disabled a missing argument is a
/// parse error.
pub fn required<T, F>(
    arg: Option<T>,
    interactive: bool,
    question: &str,
    parse: F,
) -> Result<T>
where
    F: Fn(&str) -> Result<T>,
{
    if let Some(value) = arg {
        return Ok(value);
    }
    if !interactive {
        return Err(SamplerError::Parse(format!(
            "missing required value ({}) and prompting is disabled",
            question.trim_end_matches([' ', ':'])
        )));
    }
    loop {
        let input = prompt_line(question)?;
        match parse(&input) {
            Ok(value) => return Ok(value),
            Err(err) => eprintln!("{}", err),
        }
    }
}

/// Optional prompt: empty input yields `None`. Digits-only is enforced by
/// the caller's parse function.
pub fn optional<T, F>(
    arg: Option<T>,
    interactive: bool,
    question: &str,
    parse: F,
) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<T>,
{
    if let Some(value) = arg {
        return Ok(Some(value));
    }
    if !interactive {
        return Ok(None);
    }
    let input = prompt_line(question)?;
    if input.is_empty() {
        return Ok(None);
    }
    Ok(parse(&input))
}

/// Digits-only port parse; anything else means "scan for one".
pub fn parse_port(input: &str) -> Option<u16> {
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        input.parse().ok()
    } else {
        None
    }
}
