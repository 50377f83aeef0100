use colored::Colorize;

pub struct Theme {
    pub title: fn(&str) -> String,
    pub handle: fn(&str) -> String,
    pub line: fn(&str) -> String,
    pub idx: fn(&str) -> String,
    pub body: fn(&str) -> String,
    pub meta: fn(&str) -> String,
    pub label: fn(&str) -> String,
    pub up: fn(&str) -> String,
    pub down: fn(&str) -> String,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "temp" | "" => Self::temp(),
            "neon" => Self::neon(),
            "canvas" => Self::canvas(),
            _ => {
                eprintln!("{}", format!("✘ Unknown theme: {}", name).red());
                Self::temp()
            }
        }
    }

    fn temp() -> Self {
        Self {
            title: |s| s.bright_magenta().bold().to_string(),
            handle: |s| s.cyan().italic().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.bright_white().to_string(),
            body: |s| s.white().to_string(),
            meta: |s| s.bright_white().dimmed().italic().to_string(),
            label: |s| s.yellow().to_string(),
            up: |s| s.green().to_string(),
            down: |s| s.red().to_string(),
        }
    }

    fn neon() -> Self {
        Self {
            title: |s| s.bright_cyan().bold().underline().to_string(),
            handle: |s| s.bright_magenta().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.bright_white().to_string(),
            body: |s| s.bright_white().to_string(),
            meta: |s| s.bright_yellow().dimmed().italic().to_string(),
            label: |s| s.bright_blue().to_string(),
            up: |s| s.bright_green().bold().to_string(),
            down: |s| s.bright_red().bold().to_string(),
        }
    }

    fn canvas() -> Self {
        Self {
            title: |s| s.blue().bold().underline().to_string(),
            handle: |s| s.magenta().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.cyan().to_string(),
            body: |s| s.black().to_string(),
            meta: |s| s.bright_black().italic().to_string(),
            label: |s| s.bright_cyan().bold().to_string(),
            up: |s| s.green().to_string(),
            down: |s| s.red().bold().to_string(),
        }
    }

    /// Color a percentage change by sign
    pub fn change(&self, pct: f64) -> String {
        let text = format!("{:+.2}%", pct);
        if pct < 0.0 {
            (self.down)(&text)
        } else {
            (self.up)(&text)
        }
    }
}
