//! Color helpers for listings printed to stdout.

use owo_colors::OwoColorize;
use std::fmt::Display;

pub struct Style;

impl Style {
    pub fn header<T: Display>(text: T) -> String {
        format!("{}", text.bold())
    }

    /// Keys such as `endpoint` or `models`.
    pub fn label<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    /// Provider and model names.
    pub fn value<T: Display>(text: T) -> String {
        format!("{}", text.cyan())
    }

    pub fn secondary<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    pub fn success<T: Display>(text: T) -> String {
        format!("{}", text.green())
    }

    pub fn warning<T: Display>(text: T) -> String {
        format!("{}", text.yellow())
    }

    pub fn code<T: Display>(text: T) -> String {
        format!("{}", text.yellow())
    }

    pub fn default_marker() -> String {
        format!("{}", "(default)".dimmed())
    }
}
