use crate::translation::SUPPORTED_LANGUAGES;
use crate::translation::language::AUTO_DETECT;
use crate::ui::Style;

/// Prints every accepted language code with its name.
pub fn print_languages() {
    println!("{}", Style::header("Supported language codes (ISO 639-1)"));
    for (code, name) in SUPPORTED_LANGUAGES {
        println!("  {} {}", Style::code(format!("{code:6}")), Style::secondary(name));
    }
    println!(
        "\n  {} {}",
        Style::code(format!("{AUTO_DETECT:6}")),
        Style::secondary("detect the source language (--from only)")
    );
}
