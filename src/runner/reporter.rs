use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Console narrator for a test run.
///
/// All presentation goes through this object instead of ad hoc prints,
/// so scenario code stays free of styling concerns and piped output
/// stays free of escape codes.
pub struct Reporter {
    multi: MultiProgress,
    interactive: bool,
}

impl Reporter {
    pub fn new() -> Self {
        let interactive = std::io::stdout().is_terminal();
        let multi = if interactive {
            MultiProgress::new()
        } else {
            // When not a TTY (piped output), use hidden target to avoid terminal escape codes
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        Self { multi, interactive }
    }

    /// Suite title, printed once at the top.
    pub fn banner(&self, title: &str) {
        self.line(format!(
            "\n{}",
            format!("═══ {} ═══", title).blue().bold()
        ));
    }

    /// Bold section header between scenario groups.
    pub fn phase(&self, message: &str) {
        self.line(format!("\n{}", message.bold()));
    }

    /// Something is being waited on.
    pub fn pending(&self, message: &str) {
        self.line(message.yellow().to_string());
    }

    pub fn success(&self, message: &str) {
        self.line(format!("{} {}", "✓".green(), message.green()));
    }

    pub fn warn(&self, message: &str) {
        self.line(format!("{} {}", "⚠".yellow(), message.yellow()));
    }

    pub fn error(&self, message: &str) {
        self.line(format!("{} {}", "✗".red(), message.red()));
    }

    /// Dim side-channel detail (current agent set, written file paths).
    pub fn note(&self, message: &str) {
        self.line(message.dimmed().to_string());
    }

    /// Start the spinner for one scenario.
    pub fn scenario_started(&self, name: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("  {spinner} {msg}")
            .unwrap();
        pb.set_style(style);
        pb.set_message(format!("{}... ", name.dimmed()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn scenario_passed(&self, pb: ProgressBar, name: &str, duration_ms: u64, note: Option<&str>) {
        pb.finish_and_clear();
        let mut line = format!("  {} {} ({}ms)", "✓".green(), name, duration_ms);
        if let Some(note) = note {
            line.push_str(&format!(" {}", format!("[{}]", note).yellow()));
        }
        self.line(line);
    }

    pub fn scenario_failed(&self, pb: ProgressBar, name: &str, duration_ms: u64) {
        pb.finish_and_clear();
        self.line(format!("  {} {} ({}ms)", "✗".red(), name, duration_ms));
    }

    // MultiProgress::println coordinates with live spinners but drops
    // output entirely on a hidden draw target, so piped runs print
    // directly instead.
    fn line(&self, text: String) {
        if self.interactive {
            self.multi.println(text).ok();
        } else {
            println!("{}", text);
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
