use lazy_static::lazy_static;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::{
    fetch::{self, RetryPolicy, SpellError},
    Error, Spell, SpellFilter,
};

static LISTING: &str = "https://www.tibia.com/library/?subtopic=spells";

fn based(href: &str) -> String {
    static BASE: &str = "https://www.tibia.com";
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{BASE}/{}", href.trim_start_matches('/'))
    }
}

/// Result of one catalog walk. A page that failed to fetch or parse lands in
/// `failures` with its reason; the rest of the walk is unaffected.
#[derive(Debug, Default)]
pub struct Catalog {
    pub spells: Vec<Spell>,
    pub failures: Vec<SpellFailure>,
}

#[derive(Debug)]
pub struct SpellFailure {
    pub url: String,
    pub reason: SpellError,
}

impl Catalog {
    /// Record the outcome of one detail page. A failure is kept next to the
    /// spells that did parse instead of discarding the walk.
    fn absorb(&mut self, url: String, outcome: Result<Option<Spell>, SpellError>) {
        match outcome {
            Ok(Some(spell)) => self.spells.push(spell),
            Ok(None) => tracing::warn!(%url, "empty spell page, nothing to parse"),
            Err(reason) => {
                tracing::warn!(%url, %reason, "skipping spell");
                self.failures.push(SpellFailure { url, reason });
            }
        }
    }
}

/// POST the filter to the spell listing and walk every linked detail page,
/// strictly in listing order, one request at a time.
///
/// A listing that matches nothing returns an empty catalog; an unreachable or
/// empty listing is an error, the two are never conflated.
pub async fn fetch_catalog(
    client: &Client,
    filter: &SpellFilter,
    retry: &RetryPolicy,
) -> Result<Catalog, Error> {
    let links = {
        let doc = request_listing(client, filter).await?;
        let doc = Html::parse_document(&doc);
        parse_listing(&doc)
    };
    tracing::debug!(spells = links.len(), "walking the spell listing");

    let mut catalog = Catalog::default();
    for url in links {
        let outcome = fetch::fetch_spell(client, &url, retry).await;
        catalog.absorb(url, outcome);
    }
    Ok(catalog)
}

async fn request_listing(client: &Client, filter: &SpellFilter) -> Result<String, Error> {
    let response = client.post(LISTING).form(&filter.as_form()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Listing(status));
    }
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(Error::EmptyListing);
    }
    Ok(body)
}

fn parse_listing(doc: &Html) -> Vec<String> {
    lazy_static! {
        static ref SPELL_LINK: Selector = Selector::parse("div#spells table a").unwrap();
    };
    /*
     * <div id="spells">
     *  <table>
     *   <tr><td><a href="/library/?subtopic=spells&spell=exura">Light Healing</a></td></tr>
     *   <tr><td><a href="/library/?subtopic=spells&spell=exori">Berserk</a></td></tr>
     *   ...
     */
    doc.select(&SPELL_LINK)
        .filter_map(|link| link.value().attr("href"))
        .map(based)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{detail, output};

    const LISTING_PAGE: &str = r##"
        <html><body>
          <a href="/news">News</a>
          <div id="spells">
            <table>
              <tr><td><a href="/library/?subtopic=spells&spell=exura">Light Healing</a></td></tr>
              <tr><td><a href="https://www.tibia.com/library/?subtopic=spells&spell=exori">Berserk</a></td></tr>
            </table>
          </div>
          <a href="/community">Community</a>
        </body></html>
    "##;

    #[test]
    fn listing_links_come_back_absolute_and_in_page_order() {
        let doc = Html::parse_document(LISTING_PAGE);
        assert_eq!(
            parse_listing(&doc),
            [
                "https://www.tibia.com/library/?subtopic=spells&spell=exura",
                "https://www.tibia.com/library/?subtopic=spells&spell=exori",
            ]
        );
    }

    #[test]
    fn anchors_outside_the_spell_table_are_ignored() {
        let doc = Html::parse_document(LISTING_PAGE);
        assert!(parse_listing(&doc).iter().all(|url| url.contains("spell=")));
    }

    #[test]
    fn a_listing_with_no_matches_is_an_empty_catalog_not_an_error() {
        let doc = Html::parse_document(r#"<div id="spells"><table></table></div>"#);
        assert_eq!(parse_listing(&doc), Vec::<String>::new());
    }

    #[test]
    fn a_bad_page_is_recorded_without_discarding_the_rest() {
        let good = detail::parse_spell(&spell_page(&["Name: Berserk", "Exp Lvl: 35"])).unwrap();
        let bad = detail::parse_spell(&spell_page(&["Name: Broken"])).unwrap_err();

        let mut catalog = Catalog::default();
        catalog.absorb("first".to_string(), Err(bad.into()));
        catalog.absorb("second".to_string(), Ok(None));
        catalog.absorb("third".to_string(), Ok(Some(good.clone())));

        assert_eq!(catalog.spells, [good]);
        let [failure] = &catalog.failures[..] else {
            panic!("expected exactly one failure, got {:?}", catalog.failures);
        };
        assert_eq!(failure.url, "first");
        assert!(matches!(
            failure.reason,
            SpellError::Parse(detail::ParseError::MissingLevel)
        ));
    }

    fn spell_page(rows: &[&str]) -> String {
        let rows: String = rows
            .iter()
            .map(|row| format!("<tr><td>{row}</td></tr>"))
            .collect();
        format!("<table>{rows}</table>")
    }

    // Offline pipeline run: listing fixture -> detail fixtures -> JSON file.
    #[tokio::test]
    async fn two_listed_spells_end_up_in_the_file_in_link_order() {
        let pages = [
            spell_page(&[
                "Name: Light Healing",
                "Formula: exura",
                "Vocation: Druids, Sorcerers",
                "Group: Healing",
                "Type: Instant",
                "Cooldown: 1s(Group: 1s)",
                "Exp Lvl: 8",
                "Mana: 20",
                "Price: 0",
                "City: Thais",
                "Premium: no",
            ]),
            spell_page(&[
                "Name: Berserk",
                "Formula: exori",
                "Vocation: Knights",
                "Group: Attack",
                "Type: Instant",
                "Damage Type: Physical",
                "Cooldown: 4s(Group: 2s)",
                "Exp Lvl: 35",
                "Mana: 115",
                "Price: 2500",
                "City: Edron, Thais",
                "Premium: yes",
            ]),
        ];

        let doc = Html::parse_document(LISTING_PAGE);
        let links = parse_listing(&doc);
        assert_eq!(links.len(), pages.len());

        let spells: Vec<_> = pages
            .iter()
            .map(|page| detail::parse_spell(page).unwrap())
            .collect();

        let dir = tempfile::tempdir().unwrap();
        let path = output::save_catalog(&spells, dir.path()).await.unwrap();

        let json = tokio::fs::read_to_string(&path).await.unwrap();
        let array: serde_json::Value = serde_json::from_str(&json).unwrap();
        let array = array.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["name"], "Light Healing");
        assert_eq!(array[1]["name"], "Berserk");

        let field_names = [
            "name",
            "formula",
            "vocationToCast",
            "group",
            "type",
            "cooldown",
            "groupCooldown",
            "minimumLevel",
            "manaCost",
            "priceToLearn",
            "citiesToLearn",
            "premiumOnly",
            "soulPoints",
            "charges",
            "damageType",
        ];
        for object in array {
            let object = object.as_object().unwrap();
            assert_eq!(object.len(), field_names.len());
            for name in field_names {
                assert!(object.contains_key(name), "missing field {name}");
            }
        }
    }
}
