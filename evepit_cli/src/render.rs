use std::fmt;

use evepit_core::CharacterReport;

/// Operator-facing text layout: a header per character, one block per
/// planet, one bracketed line per installation with its products indented.
pub(crate) struct TextReport<'a>(pub &'a CharacterReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "=== {} ===", report.character_name)?;

        for planet in &report.planets {
            writeln!(
                f,
                "{} ({}) [@{}]",
                planet.planet_name, planet.planet_type, planet.last_update
            )?;

            for installation in &planet.installations {
                writeln!(f, "[{}]", installation.installation_name)?;
                for product in &installation.products {
                    writeln!(f, "  [+] {}: {}", product.product_name, product.amount)?;
                }
            }

            writeln!(f)?;
        }

        Ok(())
    }
}
