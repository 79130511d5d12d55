use crate::Spell;
use lazy_static::lazy_static;
use scraper::{Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("spell page has no `Exp Lvl:` row")]
    MissingLevel,
    #[error("experience level `{0}` is not a number")]
    InvalidLevel(String),
}

/// Parse one spell detail page.
///
/// Every attribute lives in its own table row, looked up by label. Lookups are
/// independent of row order: rune pages carry an "Amount:" row instant pages
/// lack, and nothing assumes a stable section layout.
pub fn parse_spell(html: &str) -> Result<Spell, ParseError> {
    lazy_static! {
        static ref ROW: Selector = Selector::parse("tr").unwrap();
    };
    /*
     * <tr><td>Name:</td><td>Light Healing</td></tr>
     * <tr><td>Formula:</td><td>exura</td></tr>
     * <tr><td>Vocation:</td><td>Druids, Sorcerers</td></tr>
     * ...
     * <tr><td>Cooldown:</td><td>1s(Group: 1s)</td></tr>
     * <tr><td>Exp Lvl:</td><td>8</td></tr>
     */
    let doc = Html::parse_document(html);
    let rows = Rows(
        doc.select(&ROW)
            .map(|row| row.text().collect::<String>())
            .collect(),
    );

    let level = rows.value("Exp Lvl:").ok_or(ParseError::MissingLevel)?;
    let minimum_level = level.parse().map_err(|_| ParseError::InvalidLevel(level))?;
    let (cooldown, group_cooldown) = rows.cooldowns("Cooldown:");

    Ok(Spell {
        name: rows.value("Name:"),
        formula: rows.value("Formula:"),
        vocation_to_cast: rows.list("Vocation:"),
        group: rows.value("Group:"),
        kind: rows.value("Type:"),
        cooldown,
        group_cooldown,
        minimum_level,
        mana_cost: rows.number("Mana:"),
        price_to_learn: rows.number("Price:"),
        cities_to_learn: rows.list("City:"),
        premium_only: rows.flag("Premium:"),
        soul_points: rows.number("Soul Points:"),
        charges: rows.number("Amount:"),
        damage_type: rows.value("Damage Type:"),
    })
}

/// Visible text of every table row on the page, keyed by label substring.
struct Rows(Vec<String>);

impl Rows {
    /// Trimmed text after `label` in the first row that contains it.
    fn value(&self, label: &str) -> Option<String> {
        self.0.iter().find_map(|row| {
            let (_, rest) = row.split_once(label)?;
            Some(rest.trim().to_string())
        })
    }

    /// Split on ", ", dropping empty segments. Absent row is an empty list.
    fn list(&self, label: &str) -> Vec<String> {
        self.value(label)
            .map(|raw| {
                raw.split(", ")
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Best-effort integer. Absent or non-numeric values are 0.
    fn number(&self, label: &str) -> u32 {
        self.value(label)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    /// True only for the literal value "yes".
    fn flag(&self, label: &str) -> bool {
        self.value(label).as_deref() == Some("yes")
    }

    /// The cooldown row packs two values: `<spell>(Group: <group>)`.
    fn cooldowns(&self, label: &str) -> (Option<String>, Option<String>) {
        let Some(raw) = self.value(label) else {
            return (None, None);
        };
        let mut parts = raw
            .split("(Group: ")
            .flat_map(|part| part.split(')'))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned);
        (parts.next(), parts.next())
    }
}
