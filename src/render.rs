//! Projection of the session into HTML.
//!
//! Cards are built as plain values first (`build_card`) and only then written
//! out as markup, which keeps the templating rules testable without parsing
//! HTML. The page is rebuilt in full on every request.
use crate::favourites::FavouritesList;
use crate::models::ShowRecord;
use crate::sanitize::{escape_html, sanitize};
use crate::session::Session;
use std::fmt::Write;

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/210x295";
pub const NO_SUMMARY: &str = "There is no summary.";
pub const NO_CAST: &str = "No cast specified";
pub const NO_RESULTS: &str = "No results found.";
const SUMMARY_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOrigin {
    SearchResult,
    Favourite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardImage {
    /// `<img>` thumbnail on grid cards.
    Thumbnail(String),
    /// Background-image block on the detailed card.
    Preview(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsToggle {
    Open,
    Close,
}

impl DetailsToggle {
    pub fn label(self) -> &'static str {
        match self {
            DetailsToggle::Open => "Show details",
            DetailsToggle::Close => "Hide details",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavouriteToggle {
    Add,
    Remove,
}

impl FavouriteToggle {
    pub fn label(self) -> &'static str {
        match self {
            FavouriteToggle::Add => "Add to favourites",
            FavouriteToggle::Remove => "Remove from favourites",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub show_id: u32,
    pub title: String,
    pub image: CardImage,
    pub cast_line: Option<String>,
    pub summary: String,
    pub details: DetailsToggle,
    pub favourite: Option<FavouriteToggle>,
    pub origin: CardOrigin,
}

pub fn build_card(
    record: &ShowRecord,
    detailed: bool,
    origin: CardOrigin,
    is_favourite: bool,
) -> Card {
    let image = match (&record.image, detailed) {
        (Some(img), true) => CardImage::Preview(img.original.clone()),
        (Some(img), false) => CardImage::Thumbnail(img.medium.clone()),
        (None, true) => CardImage::Preview(PLACEHOLDER_IMAGE.to_string()),
        (None, false) => CardImage::Thumbnail(PLACEHOLDER_IMAGE.to_string()),
    };

    let cast_line = detailed.then(|| {
        if record.cast.is_empty() {
            NO_CAST.to_string()
        } else {
            format!("Cast: {}", record.cast.join(", "))
        }
    });

    let summary = match record.summary_text() {
        Some(raw) if detailed => sanitize(raw),
        Some(raw) => preview(&sanitize(raw)),
        None => NO_SUMMARY.to_string(),
    };

    let favourite = (!detailed && origin == CardOrigin::SearchResult).then_some(if is_favourite {
        FavouriteToggle::Remove
    } else {
        FavouriteToggle::Add
    });

    Card {
        show_id: record.id,
        title: record.name.clone(),
        image,
        cast_line,
        summary,
        details: if detailed {
            DetailsToggle::Close
        } else {
            DetailsToggle::Open
        },
        favourite,
        origin,
    }
}

/// First 40 characters plus an ellipsis, ignoring word boundaries.
fn preview(text: &str) -> String {
    let head: String = text.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    format!("{head}...")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub cards: Vec<Card>,
    pub result_count: usize,
    pub counter: String,
    pub status: Option<String>,
}

/// Favourite cards first, then one card per search result. Only search
/// results are counted.
pub fn render_results(favourites: &FavouritesList, results: &[ShowRecord]) -> ResultsView {
    let mut cards: Vec<Card> = favourites
        .records()
        .iter()
        .map(|r| build_card(r, false, CardOrigin::Favourite, true))
        .collect();
    cards.extend(
        results
            .iter()
            .map(|r| build_card(r, false, CardOrigin::SearchResult, favourites.contains(r.id))),
    );
    ResultsView {
        cards,
        result_count: results.len(),
        counter: format!("Number of results: {}", results.len()),
        status: results.is_empty().then(|| NO_RESULTS.to_string()),
    }
}

pub fn render_page(session: &Session, presets: &[String]) -> String {
    let results = render_results(&session.favourites, &session.results);
    let status = session
        .notice
        .clone()
        .or_else(|| results.status.clone())
        .unwrap_or_default();
    let overlay = session.overlay.as_ref().map(|r| {
        build_card(
            r,
            true,
            CardOrigin::SearchResult,
            session.favourites.contains(r.id),
        )
    });

    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>showshelf</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n");
    let _ = writeln!(
        html,
        "<body{}>",
        if overlay.is_some() {
            " class=\"overlay-open\""
        } else {
            ""
        }
    );

    html.push_str("<header>\n<form id=\"searchForm\" method=\"post\" action=\"/search\">\n");
    let _ = writeln!(
        html,
        "<input id=\"searchInput\" name=\"query\" type=\"search\" value=\"\" placeholder=\"{}\">",
        escape_html(&session.selected_key)
    );
    html.push_str("<button id=\"searchSubmit\" type=\"submit\">Search</button>\n</form>\n");

    html.push_str("<nav id=\"presets\">\n");
    for name in presets {
        let active = if name.eq_ignore_ascii_case(&session.selected_key) {
            " active"
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "<form method=\"post\" action=\"/presets/{}\"><button class=\"btn btn-preset{}\" data-show-name=\"{}\">{}</button></form>",
            urlencoding::encode(name),
            active,
            escape_html(name),
            escape_html(name)
        );
    }
    html.push_str("</nav>\n</header>\n");

    let _ = writeln!(
        html,
        "<p id=\"resultsCounter\">{}</p>",
        escape_html(&results.counter)
    );
    let _ = writeln!(html, "<p id=\"statusLine\">{}</p>", escape_html(&status));

    html.push_str("<main id=\"showsWrapper\">\n");
    for card in &results.cards {
        write_card(&mut html, card);
    }
    html.push_str("</main>\n");

    let _ = writeln!(
        html,
        "<section id=\"showPreview\" style=\"display: {}\">",
        if overlay.is_some() { "block" } else { "none" }
    );
    if let Some(card) = &overlay {
        write_card(&mut html, card);
    }
    html.push_str("</section>\n</body>\n</html>\n");
    html
}

fn write_card(html: &mut String, card: &Card) {
    let class = match card.origin {
        CardOrigin::Favourite => "card card-favourite",
        CardOrigin::SearchResult => "card",
    };
    let _ = writeln!(
        html,
        "<div class=\"{class}\" data-card-id=\"{}\">\n<div class=\"card-body\">",
        card.show_id
    );
    match &card.image {
        CardImage::Thumbnail(url) => {
            let _ = writeln!(
                html,
                "<img class=\"card-img-top\" src=\"{}\" alt=\"{}\">",
                escape_html(url),
                escape_html(&card.title)
            );
        }
        CardImage::Preview(url) => {
            let _ = writeln!(
                html,
                "<div class=\"card-preview-bg\" style=\"background-image: url('{}')\"></div>",
                escape_html(&css_safe_url(url))
            );
        }
    }
    let _ = writeln!(
        html,
        "<h5 class=\"card-title\">{}</h5>",
        escape_html(&card.title)
    );
    if let Some(cast) = &card.cast_line {
        let _ = writeln!(html, "<h6 class=\"card-title\">{}</h6>", escape_html(cast));
    }
    let _ = writeln!(
        html,
        "<p class=\"card-text\">{}</p>",
        escape_html(&card.summary).replace('\n', "<br>")
    );

    let (action, button_class) = match card.details {
        DetailsToggle::Open => (format!("/details/{}", card.show_id), "btn btn-primary"),
        DetailsToggle::Close => ("/overlay/close".to_string(), "btn btn-danger"),
    };
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"{action}\"><button class=\"{button_class}\" data-show-id=\"{}\">{}</button></form>",
        card.show_id,
        card.details.label()
    );
    if let Some(toggle) = card.favourite {
        let action = match toggle {
            FavouriteToggle::Add => format!("/favourites/{}", card.show_id),
            FavouriteToggle::Remove => format!("/favourites/{}/remove", card.show_id),
        };
        let _ = writeln!(
            html,
            "<form method=\"post\" action=\"{action}\"><button class=\"btn btn-favourite\" data-favourite-id=\"{}\">{}</button></form>",
            card.show_id,
            toggle.label()
        );
    }
    html.push_str("</div>\n</div>\n");
}

fn css_safe_url(url: &str) -> String {
    url.replace('\'', "%27")
        .replace('"', "%22")
        .replace('(', "%28")
        .replace(')', "%29")
}

const STYLE: &str = "body{font-family:sans-serif;margin:1rem}\
body.overlay-open{overflow:hidden}\
#showsWrapper{display:flex;flex-wrap:wrap;gap:1rem}\
.card{width:210px;border:1px solid #ccc;border-radius:4px}\
.card-favourite{border-color:#d4a017}\
.card-img-top{width:100%}\
.card-body{padding:.5rem}\
.card-preview-bg{height:400px;background-size:contain;background-repeat:no-repeat;background-position:center}\
.btn-danger{background-color:red;color:#fff}\
.btn-preset.active{font-weight:bold}\
#statusLine{color:#b00}\
#showPreview{position:fixed;inset:5%;overflow:auto;background:#fff;border:1px solid #333;padding:1rem}\
#showPreview .card{width:auto}";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShowImage;

    fn bare(id: u32) -> ShowRecord {
        ShowRecord {
            id,
            name: format!("Show {id}"),
            image: None,
            summary: None,
            cast: vec![],
        }
    }

    fn full(id: u32) -> ShowRecord {
        ShowRecord {
            id,
            name: "Harry & Friends".to_string(),
            image: Some(ShowImage {
                medium: "https://img/m.jpg".to_string(),
                original: "https://img/o.jpg".to_string(),
            }),
            summary: Some("<p>A <b>wizard</b> story.</p>".to_string()),
            cast: vec!["Ann".to_string(), "Bob".to_string(), "Cy".to_string()],
        }
    }

    #[test]
    fn bare_record_uses_placeholders() {
        let detailed = build_card(&bare(1), true, CardOrigin::SearchResult, false);
        assert_eq!(
            detailed.image,
            CardImage::Preview(PLACEHOLDER_IMAGE.to_string())
        );
        assert_eq!(detailed.summary, NO_SUMMARY);
        assert_eq!(detailed.cast_line.as_deref(), Some(NO_CAST));

        let grid = build_card(&bare(1), false, CardOrigin::SearchResult, false);
        assert_eq!(
            grid.image,
            CardImage::Thumbnail(PLACEHOLDER_IMAGE.to_string())
        );
        assert_eq!(grid.summary, NO_SUMMARY);
        assert_eq!(grid.cast_line, None);
    }

    #[test]
    fn long_summary_is_cut_at_forty_chars() {
        let mut record = bare(2);
        let text: String = "abcdefghij".repeat(10);
        record.summary = Some(text.clone());
        let card = build_card(&record, false, CardOrigin::SearchResult, false);
        assert_eq!(card.summary, format!("{}...", &text[..40]));

        let detailed = build_card(&record, true, CardOrigin::SearchResult, false);
        assert_eq!(detailed.summary, text);
    }

    #[test]
    fn only_an_empty_summary_counts_as_missing() {
        let mut record = bare(4);
        record.summary = Some(String::new());
        let card = build_card(&record, false, CardOrigin::SearchResult, false);
        assert_eq!(card.summary, NO_SUMMARY);

        record.summary = Some("  <p> </p> ".to_string());
        let card = build_card(&record, false, CardOrigin::SearchResult, false);
        assert_eq!(card.summary, "...");
        let detailed = build_card(&record, true, CardOrigin::SearchResult, false);
        assert_eq!(detailed.summary, "");
    }

    #[test]
    fn detailed_card_joins_cast_and_uses_original_image() {
        let card = build_card(&full(3), true, CardOrigin::SearchResult, false);
        assert_eq!(card.cast_line.as_deref(), Some("Cast: Ann, Bob, Cy"));
        assert_eq!(card.image, CardImage::Preview("https://img/o.jpg".to_string()));
        assert_eq!(card.summary, "A wizard story.");
        assert_eq!(card.details, DetailsToggle::Close);
        assert_eq!(card.favourite, None);
    }

    #[test]
    fn favourite_toggle_follows_membership_and_origin() {
        let add = build_card(&full(4), false, CardOrigin::SearchResult, false);
        assert_eq!(add.favourite, Some(FavouriteToggle::Add));
        let remove = build_card(&full(4), false, CardOrigin::SearchResult, true);
        assert_eq!(remove.favourite, Some(FavouriteToggle::Remove));
        let listed = build_card(&full(4), false, CardOrigin::Favourite, true);
        assert_eq!(listed.favourite, None);
        assert_eq!(listed.details, DetailsToggle::Open);
    }

    #[test]
    fn favourites_come_first_and_are_not_counted() {
        let store = crate::store::MemoryStore::new();
        let favs = crate::favourites::add(&store, &FavouritesList::new(), bare(9)).unwrap();
        let view = render_results(&favs, &[bare(1), bare(9)]);
        let origins: Vec<(u32, CardOrigin)> =
            view.cards.iter().map(|c| (c.show_id, c.origin)).collect();
        assert_eq!(
            origins,
            vec![
                (9, CardOrigin::Favourite),
                (1, CardOrigin::SearchResult),
                (9, CardOrigin::SearchResult)
            ]
        );
        assert_eq!(view.counter, "Number of results: 2");
        assert_eq!(view.status, None);
        assert_eq!(view.cards[2].favourite, Some(FavouriteToggle::Remove));
    }

    #[test]
    fn zero_results_sets_status() {
        let view = render_results(&FavouritesList::new(), &[]);
        assert_eq!(view.result_count, 0);
        assert_eq!(view.status.as_deref(), Some(NO_RESULTS));
    }

    #[test]
    fn page_escapes_titles_and_shows_overlay() {
        let mut session = Session::new("harry".to_string(), FavouritesList::new());
        let t = session.begin_search("harry".to_string());
        session.apply_search(&t, vec![full(5)]);
        let d = session.begin_details(5);
        session.apply_details(&d, full(5));

        let html = render_page(&session, &["harry".to_string()]);
        assert!(html.contains("Harry &amp; Friends"));
        assert!(!html.contains("Harry & Friends"));
        assert!(html.contains("<body class=\"overlay-open\">"));
        assert!(html.contains("id=\"showPreview\" style=\"display: block\""));
        assert!(html.contains("Hide details"));
        assert!(html.contains("background-image: url('https://img/o.jpg')"));
    }
}
