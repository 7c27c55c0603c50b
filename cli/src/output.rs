use console::style;

/// Thin wrapper over stdout keeping colored/quiet handling in one place.
pub struct OutputManager {
    colored: bool,
    quiet: bool,
}

impl OutputManager {
    pub fn new(colored: bool, quiet: bool) -> Self {
        Self { colored, quiet }
    }

    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    pub fn print_success(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.colored {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("✓ {}", message);
        }
    }

    pub fn print_warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.colored {
            println!("{} {}", style("!").yellow(), message);
        } else {
            println!("! {}", message);
        }
    }

    pub fn print_key_value(&self, key: &str, value: &str) {
        if self.quiet {
            return;
        }
        if self.colored {
            println!("  {}: {}", style(key).bold(), value);
        } else {
            println!("  {}: {}", key, value);
        }
    }
}

/// Mean of a slice, 0.0 when empty; used for the end-of-run summaries.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
