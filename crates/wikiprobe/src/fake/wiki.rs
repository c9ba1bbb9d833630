//! A small synthetic wiki with the markup the page objects expect.
//!
//! Serves the main page, a handful of articles, the search results page and
//! the login form, so the whole scenario catalog can run without a network.

use rand::seq::SliceRandom;

use super::dom::{ClickBehavior, El, FakeDocument, FormValue};
use super::page::{FakeRequest, FakeResponse, FakeSite};

/// Account the fake login backend accepts
pub const VALID_USERNAME: &str = "username";
/// Password of [`VALID_USERNAME`]
pub const VALID_PASSWORD: &str = "Test@password123";

/// Message shown for a search without hits
pub const NO_RESULTS_MESSAGE: &str = "There were no results matching the query.";
/// Message shown for rejected credentials
pub const LOGIN_ERROR_MESSAGE: &str = "Incorrect username or password entered. Please try again.";
/// Message shown after a successful login
pub const LOGIN_SUCCESS_MESSAGE: &str = "You are now logged in.";

const SEARCH_FIELD: &str = r#"[aria-label="Search Wikipedia"]"#;
const FEATURED_ARTICLE: &str = "Kurube_Kanga_ruins";

struct Article {
    slug: &'static str,
    title: &'static str,
    summary: &'static str,
}

const ARTICLES: &[Article] = &[
    Article {
        slug: "Kurube_Kanga_ruins",
        title: "Kurube Kanga ruins",
        summary: "The Kurube Kanga ruins are the remains of a dry-stone enclosure on a hilltop plateau.",
    },
    Article {
        slug: "Quantum",
        title: "Quantum",
        summary: "In physics, a quantum is the minimum amount of any physical entity involved in an interaction.",
    },
    Article {
        slug: "Quantum_mechanics",
        title: "Quantum mechanics",
        summary: "Quantum mechanics is a fundamental theory that describes the behavior of nature at small scales.",
    },
    Article {
        slug: "Quantum_field_theory",
        title: "Quantum field theory",
        summary: "Quantum field theory combines classical field theory, special relativity and quantum mechanics.",
    },
    Article {
        slug: "Ada_Lovelace",
        title: "Ada Lovelace",
        summary: "Ada Lovelace was an English mathematician chiefly known for her work on the Analytical Engine.",
    },
    Article {
        slug: "Volcano",
        title: "Volcano",
        summary: "A volcano is a rupture in the crust through which lava, ash and gases escape.",
    },
    Article {
        slug: "Pleiades",
        title: "Pleiades",
        summary: "The Pleiades are an open star cluster in the constellation of Taurus.",
    },
    Article {
        slug: "Tea",
        title: "Tea",
        summary: "Tea is an aromatic beverage prepared by pouring hot water over cured leaves.",
    },
    Article {
        slug: "Glacier",
        title: "Glacier",
        summary: "A glacier is a persistent body of dense ice that is constantly moving under its own weight.",
    },
    Article {
        slug: "Lighthouse",
        title: "Lighthouse",
        summary: "A lighthouse is a tower designed to emit light to serve as a navigational aid.",
    },
    Article {
        slug: "Printing_press",
        title: "Printing press",
        summary: "A printing press is a mechanical device for applying pressure to an inked surface.",
    },
    Article {
        slug: "Coral_reef",
        title: "Coral reef",
        summary: "A coral reef is an underwater ecosystem characterized by reef-building corals.",
    },
    Article {
        slug: "Wikipedia:Contents",
        title: "Wikipedia:Contents",
        summary: "Explore the encyclopedia's contents by topic, by type and by portal.",
    },
    Article {
        slug: "MediaWiki",
        title: "MediaWiki",
        summary: "MediaWiki is a free and open-source wiki software platform.",
    },
];

fn find_article(slug: &str) -> Option<&'static Article> {
    let wanted = slug.replace(' ', "_").to_lowercase();
    ARTICLES.iter().find(|a| a.slug.to_lowercase() == wanted)
}

fn href(slug: &str) -> String {
    format!("/wiki/{slug}")
}

/// The fake wiki site
#[must_use]
pub fn wiki_site() -> FakeSite {
    let mut site = FakeSite::new();
    site.route("/", |_| FakeResponse::Redirect("/wiki/Main_Page".to_string()))
        .route("/wiki/Main_Page", |_| FakeResponse::Document(main_page()))
        .route("/wiki/", |_| FakeResponse::Redirect(href(FEATURED_ARTICLE)))
        .route("/wiki/Special:Random", |_| {
            let slug = ARTICLES
                .choose(&mut rand::thread_rng())
                .map_or(FEATURED_ARTICLE, |a| a.slug);
            FakeResponse::Redirect(href(slug))
        })
        .route_prefix("/wiki/", |req| {
            let slug = req.path().trim_start_matches("/wiki/");
            let slug = percent_decode(slug);
            FakeResponse::Document(find_article(&slug).map_or_else(|| missing_article(&slug), article))
        })
        .route("/w/index.php", index_php);
    site
}

fn percent_decode(text: &str) -> String {
    url::form_urlencoded::parse(format!("x={text}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| text.to_string())
}

fn index_php(req: &FakeRequest) -> FakeResponse {
    if req.param("action").as_deref() == Some("submitlogin") {
        let user = req.param("wpName").unwrap_or_default();
        let pass = req.param("wpPassword").unwrap_or_default();
        return FakeResponse::Document(if user == VALID_USERNAME && pass == VALID_PASSWORD {
            login_page(Some(("cdx-message--success", LOGIN_SUCCESS_MESSAGE)))
        } else {
            login_page(Some(("cdx-message--error", LOGIN_ERROR_MESSAGE)))
        });
    }
    if req.param("title").as_deref() == Some("Special:UserLogin") {
        return FakeResponse::Document(login_page(None));
    }
    let query = req.param("search").unwrap_or_default();
    if req.has_param("go") {
        if let Some(hit) = find_article(query.trim()) {
            return FakeResponse::Redirect(href(hit.slug));
        }
    }
    FakeResponse::Document(search_results(&query))
}

// =============================================================================
// Shared chrome
// =============================================================================

fn main_menu() -> El {
    let items = [
        ("Main_Page", "Main page"),
        ("Wikipedia:Contents", "Contents"),
        ("Portal:Current_events", "Current events"),
        ("Special:Random", "Random article"),
        ("Wikipedia:About", "About Wikipedia"),
    ];
    El::new("div").id("vector-main-menu").hidden().children([
        El::new("button")
            .class("vector-pinnable-header-pin-button")
            .text("move to sidebar"),
        El::new("ul").children(items.into_iter().map(|(slug, label)| {
            El::new("li")
                .class("mw-list-item")
                .child(El::link(href(slug), label))
        })),
    ])
}

fn search_box() -> El {
    let suggestions = ["Quantum", "Quantum mechanics", "Quantum field theory"];
    El::new("div").class("cdx-typeahead-search").children([
        El::new("input")
            .attr("type", "search")
            .attr("name", "search")
            .attr("aria-label", "Search Wikipedia")
            .reveals_on_input(".cdx-menu"),
        El::new("button")
            .class("cdx-button")
            .class("cdx-search-input__end-button")
            .text("Search")
            .on_click(ClickBehavior::submit(
                "/w/index.php",
                vec![
                    ("search", FormValue::field(SEARCH_FIELD)),
                    ("go", FormValue::literal("Go")),
                ],
            )),
        El::new("div")
            .class("cdx-menu")
            .hidden()
            .children(suggestions.into_iter().map(|title| {
                El::new("a")
                    .class("cdx-menu-item")
                    .attr("href", href(&title.replace(' ', "_")))
                    .child(El::new("span").class("cdx-search-result-title").text(title))
            }))
            .child(
                El::new("div").class("cdx-typeahead-search__search-footer").child(
                    El::new("span")
                        .class("cdx-typeahead-search__search-footer__text")
                        .text("Search for pages containing")
                        .on_click(ClickBehavior::submit(
                            "/w/index.php",
                            vec![
                                ("search", FormValue::field(SEARCH_FIELD)),
                                ("fulltext", FormValue::literal("1")),
                            ],
                        )),
                ),
            ),
    ])
}

fn header() -> El {
    let login = "/w/index.php?title=Special:UserLogin";
    let create = "/w/index.php?title=Special:CreateAccount";
    El::new("header").class("vector-header").children([
        El::new("button")
            .attr("aria-label", "Main menu")
            .on_click(ClickBehavior::reveal("#vector-main-menu")),
        main_menu(),
        El::link(href("Main_Page"), "Wikipedia").class("mw-logo"),
        search_box(),
        El::new("ul").children([
            El::new("li")
                .id("pt-createaccount-2")
                .on_click(ClickBehavior::navigate(create))
                .child(El::link(create, "Create account")),
            El::new("li")
                .id("pt-login-2")
                .on_click(ClickBehavior::navigate(login))
                .child(El::link(login, "Log in")),
        ]),
    ])
}

fn chrome(heading: &str, content: Vec<El>) -> FakeDocument {
    FakeDocument::new(vec![
        header(),
        El::new("div").class("mw-content-container").children([
            El::new("h1").id("firstHeading").text(heading),
            El::new("div").id("mw-content-text").children(content),
        ]),
    ])
}

// =============================================================================
// Pages
// =============================================================================

fn section(title_id: &str, title: El, content_id: &str, content: Vec<El>) -> [El; 2] {
    [
        title.id(title_id),
        El::new("div").id(content_id).children(content),
    ]
}

fn main_page() -> FakeDocument {
    let linked = [
        "Ada_Lovelace",
        "Volcano",
        "Pleiades",
        "Tea",
        "Glacier",
        "Lighthouse",
        "Printing_press",
        "Coral_reef",
        "Quantum_mechanics",
        "Quantum_field_theory",
        "Quantum",
    ];
    let paragraph = |slugs: &[&str]| {
        El::new("p").text("Linked: ").children(slugs.iter().map(|slug| {
            El::link(href(slug), slug.replace('_', " "))
        }))
    };
    let featured = section(
        "mp-tfa-h2",
        El::new("h2").text("From today's featured article"),
        "mp-tfa",
        vec![
            paragraph(&linked[0..3]),
            El::new("p").text("The enclosure walls are up to four metres high. (").children([
                El::link(href(FEATURED_ARTICLE), "Full article..."),
            ]),
        ],
    );
    let news = section(
        "In_the_news",
        El::new("h2").text("In the news"),
        "mp-itn",
        vec![paragraph(&linked[3..6])],
    );
    let dyk = section(
        "mp-dyk-h2",
        El::new("h2").text("Did you know ..."),
        "mp-dyk",
        vec![
            El::new("ul").child(El::new("li").text("... that lighthouses were once lit by wood fires?")),
            paragraph(&linked[6..8]),
        ],
    );
    let otd = section(
        "On_this_day",
        El::new("h2").text("On this day"),
        "mp-otd",
        vec![paragraph(&linked[8..])],
    );
    let picture = section(
        "mp-tfp-h2",
        El::new("h2").text("Today's featured picture"),
        "mp-tfp",
        vec![El::new("div").text("A glacier seen from above.")],
    );
    chrome(
        "Main Page",
        vec![
            El::new("div").class("MainPageBG").children([
                El::new("div").id("mp-left").children(featured).children(news),
                El::new("div").id("mp-right").children(dyk).children(otd),
            ]),
            El::new("div").id("mp-lower").children(picture),
            El::new("div").id("mp-other-content").child(
                El::link("https://www.mediawiki.org/wiki/MediaWiki", "MediaWiki")
                    .attr("title", "mw:"),
            ),
        ],
    )
}

fn article(a: &Article) -> FakeDocument {
    let related: Vec<&Article> = ARTICLES.iter().filter(|o| o.slug != a.slug).take(3).collect();
    chrome(
        a.title,
        vec![
            El::new("div").class("mw-parser-output").children([
                El::new("table")
                    .class("infobox")
                    .child(El::new("caption").text(a.title))
                    .child(El::new("td").text("Type: encyclopedia article")),
                El::new("p").text(a.summary),
                El::new("div").class("mw-heading").children([
                    El::new("span").id("See_also").text("See also"),
                    El::new("ul").children(related.iter().map(|o| {
                        El::new("li").child(El::link(href(o.slug), o.title))
                    })),
                ]),
                El::new("div").class("mw-heading").children([
                    El::new("span").id("References").text("References"),
                    El::new("ol")
                        .class("references")
                        .child(El::new("li").text(format!("Survey of {}.", a.title))),
                ]),
                El::new("div").class("mw-heading").children([
                    El::new("span").id("External_links").text("External links"),
                    El::new("ul").children([
                        El::new("li").child(El::link("https://example.org/", "Official site")),
                        El::new("li").child(El::link("https://example.org/archive", "Archive")),
                    ]),
                ]),
            ]),
            El::new("div").id("catlinks").child(
                El::new("div").id("mw-normal-catlinks").children([
                    El::link(href("Help:Category"), "Categories"),
                    El::new("ul").children([
                        El::new("li").text("Encyclopedia articles"),
                        El::new("li").text(format!("{} topics", a.title)),
                    ]),
                ]),
            ),
        ],
    )
}

fn missing_article(slug: &str) -> FakeDocument {
    chrome(
        &slug.replace('_', " "),
        vec![El::new("div").id("noarticletext").child(El::new("p").text(
            "Wikipedia does not have an article with this exact name.",
        ))],
    )
}

fn search_results(query: &str) -> FakeDocument {
    let needle = query.trim().to_lowercase();
    let hits: Vec<&Article> = if needle.is_empty() {
        Vec::new()
    } else {
        ARTICLES
            .iter()
            .filter(|a| {
                a.title.to_lowercase().contains(&needle) || a.summary.to_lowercase().contains(&needle)
            })
            .collect()
    };
    let form = El::new("div").id("search").children([
        El::new("input")
            .id("searchText")
            .attr("name", "search")
            .value(query),
        El::new("button")
            .attr("type", "submit")
            .text("Search")
            .on_click(ClickBehavior::submit(
                "/w/index.php",
                vec![
                    ("search", FormValue::field("#searchText")),
                    ("fulltext", FormValue::literal("1")),
                ],
            )),
    ]);
    let results = if !needle.is_empty() && hits.is_empty() {
        El::new("p").class("mw-search-nonefound").text(NO_RESULTS_MESSAGE)
    } else {
        El::new("ul")
            .class("mw-search-results")
            .children(hits.into_iter().map(|a| {
                El::new("li").class("mw-search-result").children([
                    El::new("div")
                        .class("mw-search-result-heading")
                        .child(El::link(href(a.slug), a.title)),
                    El::new("div").class("searchresult").text(a.summary),
                ])
            }))
    };
    chrome("Search results", vec![form, results])
}

fn login_page(message: Option<(&str, &str)>) -> FakeDocument {
    let action = "/w/index.php?title=Special:UserLogin&action=submitlogin";
    let mut form = El::new("form").id("userloginForm");
    if let Some((class, text)) = message {
        form = form.child(El::new("div").class("cdx-message").class(class).text(text));
    }
    form = form.children([
        El::new("input").id("wpName1").attr("name", "wpName"),
        El::new("input")
            .id("wpPassword1")
            .attr("name", "wpPassword")
            .attr("type", "password"),
        El::new("button")
            .id("wpLoginAttempt")
            .attr("type", "submit")
            .text("Log in")
            .on_click(ClickBehavior::submit(
                action,
                vec![
                    ("wpName", FormValue::field("#wpName1")),
                    ("wpPassword", FormValue::field("#wpPassword1")),
                ],
            )),
    ]);
    chrome("Log in", vec![form])
}
