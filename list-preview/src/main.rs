use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::{Arg, ArgAction, ArgMatches, Command};
use pollster::block_on;

use list_view::entities::{articles_page_view, events_page_view};
use list_view::models::{ArticlesPageView, EventCard, EventsPageView};
use list_view::{EventType, ListController, ListEntity, MemoryTable};
use site_common::{format_date_time, parse_timestamp, Article, Event, PageMarker, Route, Society};

/// Filters and paging picked on the command line
#[derive(Clone, Debug, Default)]
struct PreviewOptions {
    query: Option<String>,
    society: Option<String>,
    year: Option<String>,
    month: Option<String>,
    date: Option<String>,
    event_type: Option<EventType>,
    search: Option<String>,
    page: Option<usize>,
    show_queries: bool,
}

fn cli() -> Command {
    Command::new("list-preview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render the events or articles list view against a JSON fixture")
        .arg(Arg::new("fixture")
            .short('f')
            .long("fixture")
            .value_name("FILE")
            .help("JSON file shaped as {\"events\": [...], \"articles\": [...]}")
            .required_unless_present("societies"))
        .arg(Arg::new("page_kind")
            .value_name("PAGE")
            .help("Which list view to render")
            .value_parser(["events", "articles"])
            .default_value("events"))
        .arg(Arg::new("query")
            .long("query")
            .value_name("QUERY")
            .help("Address bar query string to mount with, e.g. ?society=Photonics%20Society"))
        .arg(Arg::new("society").long("society").value_name("NAME").help("Society filter"))
        .arg(Arg::new("year").long("year").value_name("YYYY").help("Year filter"))
        .arg(Arg::new("month").long("month").value_name("MM").help("Month filter, needs --year"))
        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD").help("Exact date filter"))
        .arg(Arg::new("event_type")
            .long("event-type")
            .value_name("TYPE")
            .help("Events page only")
            .value_parser(["all", "upcoming", "past"]))
        .arg(Arg::new("search").short('s').long("search").value_name("TEXT").help("Text search over the page"))
        .arg(Arg::new("page")
            .short('p')
            .long("page")
            .value_name("N")
            .help("Page number, 1-based")
            .value_parser(clap::value_parser!(usize)))
        .arg(Arg::new("now")
            .long("now")
            .value_name("TIMESTAMP")
            .help("Clock used to split upcoming and past events (defaults to the current time)"))
        .arg(Arg::new("show_queries")
            .short('q')
            .long("show-queries")
            .help("Print the table queries of the refresh")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("societies")
            .long("societies")
            .help("List the societies with their page and list links, then exit")
            .action(ArgAction::SetTrue))
}

fn main() {
    let matches = cli().get_matches();

    if matches.get_flag("societies") {
        print!("{}", society_listing());
        return;
    }

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let fixture = matches
        .get_one::<String>("fixture")
        .ok_or("missing --fixture")?;
    let table = load_fixture(Path::new(fixture))?;

    let now = match matches.get_one::<String>("now") {
        Some(value) => parse_timestamp(value).ok_or_else(|| format!("Unparseable --now value '{}'", value))?,
        None => Utc::now(),
    };
    let options = options_from(matches)?;

    match matches.get_one::<String>("page_kind").map(String::as_str) {
        Some("articles") => {
            let controller = load::<Article>(&table, &options, now)?;
            print!("{}", render_articles(&articles_page_view(&controller)));
        }
        _ => {
            let controller = load::<Event>(&table, &options, now)?;
            let view = events_page_view(&controller, |date| format_date_time(date));
            print!("{}", render_events(&view));
        }
    }
    Ok(())
}

fn options_from(matches: &ArgMatches) -> Result<PreviewOptions, String> {
    let text = |id: &str| matches.get_one::<String>(id).cloned();
    let event_type = match matches.get_one::<String>("event_type") {
        Some(value) => Some(value.parse::<EventType>()?),
        None => None,
    };
    let society = match matches.get_one::<String>("society") {
        Some(name) => Some(
            Society::from_name(name)
                .ok_or_else(|| format!("Unknown society '{}', see --societies", name))?
                .name()
                .to_string(),
        ),
        None => None,
    };
    Ok(PreviewOptions {
        query: text("query"),
        society,
        year: text("year"),
        month: text("month"),
        date: text("date"),
        event_type,
        search: text("search"),
        page: matches.get_one::<usize>("page").copied(),
        show_queries: matches.get_flag("show_queries"),
    })
}

fn society_listing() -> String {
    Society::ALL
        .iter()
        .map(|society| {
            format!(
                "{}\n  {}\n  {}\n  {}\n",
                society.name(),
                Route::Society(*society).path(),
                Route::Events.filtered_by_society(*society),
                Route::Articles.filtered_by_society(*society)
            )
        })
        .collect()
}

fn load_fixture(path: &Path) -> Result<MemoryTable, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read fixture '{}': {}", path.display(), e))?;
    MemoryTable::from_json(&json).map_err(|e| format!("Invalid fixture '{}': {}", path.display(), e))
}

/// Apply the options the way the page would and run one refresh
fn load<E: ListEntity>(
    table: &MemoryTable,
    options: &PreviewOptions,
    now: DateTime<Utc>,
) -> Result<ListController<E>, String> {
    let mut controller = ListController::<E>::new();

    if let Some(query) = &options.query {
        controller.seed_from_query(query);
    }
    if let Some(society) = &options.society {
        controller.set_society(society);
    }
    if let Some(year) = &options.year {
        controller.set_year(year);
    }
    if let Some(month) = &options.month {
        controller.set_month(month);
    }
    if let Some(date) = &options.date {
        controller.set_date(date);
    }
    if let Some(event_type) = options.event_type {
        controller.set_event_type(event_type);
    }
    if let Some(search) = &options.search {
        controller.set_search_term(search);
    }
    if let Some(page) = options.page {
        if page == 0 {
            return Err("Pages start at 1".to_string());
        }
        controller.go_to_page(page);
    }

    if options.show_queries {
        for query in controller.plan(&now) {
            println!("GET /{}?{}", query.table, query.to_query_string());
        }
        println!();
    }

    block_on(controller.refresh(table, now));

    if let Some(query) = &options.query {
        if let Some(synced) = controller.sync_query(query) {
            println!("URL query would become: {}", if synced.is_empty() { "(none)" } else { synced.as_str() });
        }
    }
    Ok(controller)
}

fn pagination_line(pagination: &[PageMarker], current: usize) -> String {
    pagination
        .iter()
        .map(|marker| match marker {
            PageMarker::Page(page) if *page == current => format!("[{}]", page),
            PageMarker::Page(page) => page.to_string(),
            PageMarker::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn footer(out: &mut String, total: usize, current: usize, total_pages: usize, pagination: &[PageMarker]) {
    out.push_str(&format!("\n{} result(s), page {} of {}\n", total, current, total_pages));
    if !pagination.is_empty() {
        out.push_str(&format!("Pages: {}\n", pagination_line(pagination, current)));
    }
}

fn event_lines(out: &mut String, heading: &str, cards: &[EventCard]) {
    if cards.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}\n", heading));
    for card in cards {
        out.push_str(&format!("  {}  {}", card.display_date, card.event.title));
        if let Some(venue) = &card.event.venue {
            out.push_str(&format!(" @ {}", venue));
        }
        out.push_str(&format!("  ({})\n", card.event.society));
    }
}

fn render_events(view: &EventsPageView) -> String {
    let mut out = String::from("Events\n");
    if view.upcoming.is_empty() && view.past.is_empty() {
        out.push_str("\nNo events found.\n");
    }
    event_lines(&mut out, "Upcoming Events", &view.upcoming);
    event_lines(&mut out, "Past Events", &view.past);
    footer(&mut out, view.total, view.current_page, view.total_pages, &view.pagination);
    out
}

fn render_articles(view: &ArticlesPageView) -> String {
    let mut out = String::from("Articles\n");
    if view.articles.is_empty() {
        out.push_str("\nNo articles found.\n");
    }
    for article in &view.articles {
        out.push_str(&format!(
            "\n  {}  {}\n    {}",
            article.publication_date.format("%Y-%m-%d"),
            article.title,
            article.publication
        ));
        if let Some(author) = &article.author {
            out.push_str(&format!(", {}", author));
        }
        out.push_str(&format!("  ({})\n", article.society));
    }
    footer(&mut out, view.total, view.current_page, view.total_pages, &view.pagination);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        parse_timestamp("2025-03-01T12:00:00Z").unwrap()
    }

    fn fixture() -> MemoryTable {
        let events = (1..=14)
            .map(|day| {
                json!({
                    "title": format!("Workshop {:02}", day),
                    "description": "Hands-on session",
                    "date": format!("2025-03-{:02}T18:00:00Z", day + 1),
                    "venue": if day % 2 == 0 { json!("Lab 3") } else { json!(null) },
                    "image_url": null,
                    "society": if day <= 10 { "Computer Society" } else { "Photonics Society" },
                })
            })
            .collect();
        let articles = vec![json!({
            "id": 7,
            "title": "Lasers at Home",
            "author": "R. Kim",
            "publication": "Spectrum",
            "publication_date": "2025-02-10",
            "article_url": "https://example.org/lasers",
            "image_url": "",
            "society": "Photonics Society",
            "short_description": "A primer",
        })];
        MemoryTable::new()
            .with_rows("events", events)
            .with_rows("articles", articles)
    }

    #[test]
    fn pagination_line_marks_current_page() {
        let markers = site_common::pagination_numbers(5, 10);
        assert_eq!(pagination_line(&markers, 5), "1 ... 4 [5] 6 ... 10");
    }

    #[test]
    fn second_page_of_events() {
        let options = PreviewOptions {
            page: Some(2),
            ..PreviewOptions::default()
        };
        let controller = load::<Event>(&fixture(), &options, now()).unwrap();
        let view = events_page_view(&controller, |date| date.format("%d %b").to_string());
        assert_eq!(view.total, 14);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.upcoming.len(), 2);

        let text = render_events(&view);
        assert!(text.contains("Upcoming Events"));
        assert!(text.contains("Workshop 13"));
        assert!(text.contains("14 result(s), page 2 of 2"));
        assert!(text.contains("Pages: 1 [2]"));
    }

    #[test]
    fn society_from_query_string() {
        let options = PreviewOptions {
            query: Some("?society=Photonics%20Society".to_string()),
            ..PreviewOptions::default()
        };
        let controller = load::<Event>(&fixture(), &options, now()).unwrap();
        assert_eq!(controller.filters().society, "Photonics Society");
        assert_eq!(controller.total(), 4);
    }

    #[test]
    fn articles_render_with_author() {
        let controller = load::<Article>(&fixture(), &PreviewOptions::default(), now()).unwrap();
        let text = render_articles(&articles_page_view(&controller));
        assert!(text.contains("2025-02-10  Lasers at Home"));
        assert!(text.contains("Spectrum, R. Kim  (Photonics Society)"));
    }

    #[test]
    fn empty_result_says_so() {
        let options = PreviewOptions {
            society: Some("Women in Engineering".to_string()),
            ..PreviewOptions::default()
        };
        let controller = load::<Article>(&fixture(), &options, now()).unwrap();
        let text = render_articles(&articles_page_view(&controller));
        assert!(text.contains("No articles found."));
        assert!(text.contains("0 result(s), page 1 of 0"));
    }

    #[test]
    fn society_listing_links_both_list_views() {
        let matches = cli().get_matches_from(["list-preview", "--societies"]);
        assert!(matches.get_flag("societies"));

        let listing = society_listing();
        assert!(listing.starts_with(Society::ALL[0].name()));
        assert!(listing.contains("  /events?society=Photonics+Society\n"));
        assert!(listing.contains("  /articles?society=Photonics+Society\n"));
    }

    #[test]
    fn unknown_society_option_is_rejected() {
        let matches = cli().get_matches_from(["list-preview", "-f", "site.json", "--society", "Chess Club"]);
        assert!(options_from(&matches).unwrap_err().contains("Chess Club"));

        let matches =
            cli().get_matches_from(["list-preview", "-f", "site.json", "articles", "--society", "Photonics Society"]);
        assert_eq!(
            options_from(&matches).unwrap().society.as_deref(),
            Some("Photonics Society")
        );
    }

    #[test]
    fn page_zero_is_rejected() {
        let options = PreviewOptions {
            page: Some(0),
            ..PreviewOptions::default()
        };
        assert!(load::<Event>(&fixture(), &options, now()).is_err());
    }
}
