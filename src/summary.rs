use std::time::Duration;

use itertools::Itertools;

use crate::scanner::ScanState;

/// End-of-scan figures, with found domains sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub elapsed: Duration,
    pub checked: usize,
    pub domains: Vec<String>,
}

impl Summary {
    pub fn from_state(state: &ScanState) -> Self {
        Self {
            elapsed: state.elapsed(),
            checked: state.checked_count(),
            domains: state.found().iter().sorted().cloned().collect(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("\n[*] Scan complete!\n");
        out.push_str(&format!("[*] Elapsed: {:.2}s\n", self.elapsed.as_secs_f64()));
        out.push_str(&format!("[*] Checked: {}\n", self.checked));
        out.push_str(&format!("[*] Subdomains found: {}\n", self.domains.len()));

        if !self.domains.is_empty() {
            out.push_str("\n[+] Discovered subdomains:\n");
            for domain in &self.domains {
                out.push_str(&format!("    {}\n", domain));
            }
        }
        out
    }
}

pub fn print_summary(state: &ScanState) {
    print!("{}", Summary::from_state(state).render());
}
