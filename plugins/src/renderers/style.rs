//! Terminal styling shared by the text renderer and the command output.

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// ANSI styling that degrades to plain text when colour is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn enabled(&self) -> bool {
        self.color
    }

    fn wrap(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        self.wrap(BOLD, text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.wrap(DIM, text)
    }

    pub fn green(&self, text: &str) -> String {
        self.wrap(GREEN, text)
    }

    pub fn red(&self, text: &str) -> String {
        self.wrap(RED, text)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.wrap(CYAN, text)
    }

    pub fn status(&self, success: bool) -> String {
        if success {
            self.green("ok")
        } else {
            self.red("FAILED")
        }
    }
}
