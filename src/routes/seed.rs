/**
 * Seed Routes
 * One-time sample data for a fresh installation
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::db::models::{
    BlogPost, BlogStatus, Faq, LinkTarget, Localized, Menu, MenuItem, Page, Testimonial,
    DEFAULT_AUTHOR,
};
use crate::db::normalize::{new_id, now};
use crate::db::repository::Repository;
use crate::db::store::{DocumentStore, Filter};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SeedResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_posts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testimonials: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faqs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menus: Option<usize>,
}

fn lang(en: &str, hr: &str, de: &str) -> Localized {
    Localized::from([
        ("en".to_string(), en.to_string()),
        ("hr".to_string(), hr.to_string()),
        ("de".to_string(), de.to_string()),
    ])
}

// ============================================================================
// Sample data
// ============================================================================

fn sample_posts() -> Vec<BlogPost> {
    let stamp = now();
    let post = |title: Localized, slug: &str, excerpt: Localized, content: Localized, category: &str, tags: &[&str]| BlogPost {
        id: new_id(),
        title,
        slug: slug.to_string(),
        excerpt,
        content,
        category: category.to_string(),
        featured_image: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        status: BlogStatus::Published,
        author: DEFAULT_AUTHOR.to_string(),
        created_at: stamp,
        updated_at: stamp,
    };

    vec![
        post(
            lang("Days of Private Renters", "Dani privatnih iznajmljivača", "Tage der privaten Vermieter"),
            "days-of-private-renters",
            lang(
                "New technology makes managing apartments easier for private renters every day.",
                "Nove tehnologije svakim danom olakšavaju upravljanje apartmanima privatnim iznajmljivačima.",
                "Neue Technologien erleichtern privaten Vermietern täglich die Verwaltung von Apartments.",
            ),
            lang(
                "<p>Technology partners gathered in one place to present the latest tools for tourism.</p>",
                "<p>Tehnološki partneri okupili su se na jednom mjestu kako bi predstavili najnovije alate za turizam.</p>",
                "<p>Technologiepartner stellten an einem Ort die neuesten Werkzeuge für den Tourismus vor.</p>",
            ),
            "general",
            &["events", "technology"],
        ),
        post(
            lang(
                "Choosing the Best Channel Manager for Your Business",
                "Odabir najboljeg channel managera za vaš posao",
                "Den besten Channel Manager für Ihr Unternehmen wählen",
            ),
            "choosing-best-channel-manager",
            lang(
                "Choosing the right channel manager is an important step for a successful rental business.",
                "Odabir pravog channel managera važan je korak za uspješan posao iznajmljivanja.",
                "Die Wahl des richtigen Channel Managers ist ein wichtiger Schritt für ein erfolgreiches Vermietungsgeschäft.",
            ),
            lang(
                "<p>Consider integrations, real-time synchronization, ease of use and pricing.</p>",
                "<p>Razmotrite integracije, sinkronizaciju u stvarnom vremenu, jednostavnost korištenja i cijenu.</p>",
                "<p>Achten Sie auf Integrationen, Echtzeit-Synchronisierung, Bedienbarkeit und Preis.</p>",
            ),
            "channel-manager",
            &["channel-manager", "ota"],
        ),
        post(
            lang(
                "How to Increase Direct Bookings for Your Vacation Rental",
                "Kako povećati izravne rezervacije za vaš smještaj",
                "So steigern Sie Direktbuchungen für Ihre Ferienunterkunft",
            ),
            "increase-direct-bookings",
            lang(
                "Reduce reliance on OTAs with smart pricing and a high-converting website.",
                "Smanjite ovisnost o OTA kanalima pametnim cijenama i učinkovitom web stranicom.",
                "Verringern Sie die Abhängigkeit von OTAs mit smarter Preisgestaltung und einer starken Website.",
            ),
            lang(
                "<p>A professional, mobile-friendly website converts visitors into guests.</p>",
                "<p>Profesionalna web stranica prilagođena mobitelima pretvara posjetitelje u goste.</p>",
                "<p>Eine professionelle, mobilfreundliche Website macht Besucher zu Gästen.</p>",
            ),
            "website",
            &["direct-bookings", "website", "marketing"],
        ),
    ]
}

pub fn system_pages() -> Vec<Page> {
    let stamp = now();
    let page = |slug: &str, title: Localized, meta: Localized| Page {
        id: new_id(),
        slug: slug.to_string(),
        title,
        meta_description: Some(meta),
        sections: Vec::new(),
        published: true,
        is_system_page: true,
        created_at: stamp,
        updated_at: stamp,
    };

    vec![
        page(
            "home",
            lang("Home", "Naslovnica", "Startseite"),
            lang(
                "SyncBeds - channel manager and PMS for private renters and property managers.",
                "SyncBeds - channel manager i PMS za privatne iznajmljivače i upravitelje smještaja.",
                "SyncBeds - Channel Manager und PMS für Vermieter und Verwalter.",
            ),
        ),
        page(
            "about",
            lang("About Us", "O nama", "Über uns"),
            lang(
                "Learn more about SyncBeds and our mission.",
                "Saznajte više o SyncBedsu i našoj misiji.",
                "Erfahren Sie mehr über SyncBeds und unsere Mission.",
            ),
        ),
        page(
            "pricing",
            lang("Pricing", "Cijene", "Preise"),
            lang("SyncBeds pricing plans.", "SyncBeds cjenovni paketi.", "SyncBeds Preismodelle."),
        ),
        page(
            "privacy",
            lang("Privacy Policy", "Politika privatnosti", "Datenschutzerklärung"),
            lang(
                "SyncBeds privacy policy.",
                "Politika privatnosti SyncBedsa.",
                "Datenschutzerklärung von SyncBeds.",
            ),
        ),
        page(
            "terms",
            lang("Terms & Conditions", "Uvjeti korištenja", "AGB"),
            lang(
                "SyncBeds terms and conditions.",
                "Uvjeti korištenja SyncBedsa.",
                "Allgemeine Geschäftsbedingungen von SyncBeds.",
            ),
        ),
    ]
}

fn sample_testimonials() -> Vec<Testimonial> {
    let stamp = now();
    let testimonial = |order: i64, name: &str, company: &str, location: &str, text: Localized| Testimonial {
        id: new_id(),
        name: name.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        text,
        avatar_url: None,
        order,
        active: true,
        created_at: stamp,
        updated_at: stamp,
    };

    vec![
        testimonial(
            0,
            "Michele Trioni",
            "Mediterranean Group",
            "St. Paul's Bay, Malta",
            lang(
                "SyncBeds helps me with all my obligations every day, faster and easier.",
                "SyncBeds mi svaki dan pomaže sa svim obvezama, brže i lakše.",
                "SyncBeds hilft mir jeden Tag bei allen Aufgaben, schneller und einfacher.",
            ),
        ),
        testimonial(
            1,
            "Dejan Pejović",
            "Montenegro Villas",
            "Herceg Novi, Montenegro",
            lang(
                "A good tool that speeds up guest communication and automates our processes.",
                "Dobar alat koji ubrzava komunikaciju s gostima i automatizira naše procese.",
                "Ein gutes Werkzeug, das die Gästekommunikation beschleunigt und Abläufe automatisiert.",
            ),
        ),
        testimonial(
            2,
            "Martina Majcen",
            "Teatro Studio",
            "Ljubljana, Slovenia",
            lang(
                "They presented a tailor-made product for us.",
                "Predstavili su nam proizvod izrađen po mjeri.",
                "Sie haben uns ein maßgeschneidertes Produkt vorgestellt.",
            ),
        ),
    ]
}

fn sample_faqs() -> Vec<Faq> {
    let stamp = now();
    let faq = |order: i64, category: &str, question: Localized, answer: Localized| Faq {
        id: new_id(),
        question,
        answer,
        category: category.to_string(),
        order,
        active: true,
        created_at: stamp,
        updated_at: stamp,
    };

    vec![
        faq(
            0,
            "general",
            lang(
                "What is SyncBeds and how does it help property owners?",
                "Što je SyncBeds i kako pomaže vlasnicima smještaja?",
                "Was ist SyncBeds und wie hilft es Vermietern?",
            ),
            lang(
                "An all-in-one property management solution with a channel manager, eVisitor integration and a direct booking website.",
                "Cjelovito rješenje za upravljanje smještajem s channel managerom, eVisitor integracijom i web stranicom za izravne rezervacije.",
                "Eine Komplettlösung mit Channel Manager, eVisitor-Integration und Website für Direktbuchungen.",
            ),
        ),
        faq(
            1,
            "channel-manager",
            lang(
                "How does the Channel Manager prevent double bookings?",
                "Kako channel manager sprječava dvostruke rezervacije?",
                "Wie verhindert der Channel Manager Doppelbuchungen?",
            ),
            lang(
                "Calendars are synchronized across all platforms in real time.",
                "Kalendari se sinkroniziraju na svim platformama u stvarnom vremenu.",
                "Kalender werden auf allen Plattformen in Echtzeit synchronisiert.",
            ),
        ),
        faq(
            2,
            "billing",
            lang(
                "Is there a free trial?",
                "Postoji li besplatno probno razdoblje?",
                "Gibt es eine kostenlose Testphase?",
            ),
            lang(
                "Yes, every plan can be tried free of charge before subscribing.",
                "Da, svaki paket možete besplatno isprobati prije pretplate.",
                "Ja, jeder Tarif kann vor dem Abschluss kostenlos getestet werden.",
            ),
        ),
    ]
}

fn link(order: i64, url: &str, label: Localized) -> MenuItem {
    MenuItem {
        id: new_id(),
        label,
        url: url.to_string(),
        target: LinkTarget::SameWindow,
        order,
        visible: true,
        parent_id: None,
        children: Vec::new(),
    }
}

fn default_menus() -> Vec<Menu> {
    let stamp = now();
    let header_items = || {
        vec![
            link(0, "/", lang("Home", "Naslovnica", "Start")),
            link(1, "/#features", lang("Features", "Funkcionalnosti", "Funktionen")),
            link(2, "/pricing", lang("Pricing", "Cijene", "Preise")),
            link(3, "/blog", lang("Blog", "Blog", "Blog")),
            link(4, "/about", lang("About us", "O nama", "Über uns")),
            link(5, "/contact", lang("Contact", "Kontakt", "Kontakt")),
        ]
    };
    let menu = |name: &str, items: Vec<MenuItem>| Menu {
        id: new_id(),
        name: name.to_string(),
        items,
        created_at: stamp,
        updated_at: stamp,
    };

    vec![
        menu("header", header_items()),
        menu("mobile", header_items()),
        menu(
            "footer",
            vec![
                link(0, "/privacy", lang("Privacy Policy", "Politika privatnosti", "Datenschutz")),
                link(1, "/terms", lang("Terms & Conditions", "Uvjeti korištenja", "AGB")),
            ],
        ),
    ]
}

/// Inserts `records` only when the collection is empty. Returns the count
/// inserted.
async fn seed_if_empty<T>(store: &dyn DocumentStore, records: Vec<T>) -> Result<usize, ApiError>
where
    T: crate::db::repository::Entity,
{
    let repo = Repository::<T>::new(store);
    if repo.count(&Filter::new()).await? > 0 {
        return Ok(0);
    }
    repo.insert_many(&records).await
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/seed
pub async fn seed_initial_data(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiError> {
    let store = state.store.as_ref();
    if Repository::<BlogPost>::new(store).count(&Filter::new()).await? > 0 {
        return Ok(Json(SeedResponse {
            message: "Data already seeded".to_string(),
            ..SeedResponse::default()
        }));
    }

    let blog_posts = Repository::<BlogPost>::new(store)
        .insert_many(&sample_posts())
        .await?;
    let pages = seed_if_empty(store, system_pages()).await?;
    let testimonials = Repository::<Testimonial>::new(store)
        .insert_many(&sample_testimonials())
        .await?;
    let faqs = Repository::<Faq>::new(store).insert_many(&sample_faqs()).await?;

    tracing::info!(blog_posts, pages, testimonials, faqs, "Initial data seeded");
    Ok(Json(SeedResponse {
        message: "Initial data seeded successfully".to_string(),
        blog_posts: Some(blog_posts),
        pages: Some(pages),
        testimonials: Some(testimonials),
        faqs: Some(faqs),
        menus: None,
    }))
}

/// POST /api/seed/pages-menus
pub async fn seed_pages_and_menus(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiError> {
    let store = state.store.as_ref();
    let pages = seed_if_empty(store, system_pages()).await?;
    let menus = seed_if_empty(store, default_menus()).await?;

    tracing::info!(pages, menus, "Pages/menus seed executed");
    Ok(Json(SeedResponse {
        message: "Pages/menus seed executed".to_string(),
        pages: Some(pages),
        menus: Some(menus),
        ..SeedResponse::default()
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_seed_runs_once() {
        let app = TestApp::new();
        let (status, body) = app.post("/api/seed", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Initial data seeded successfully");
        assert_eq!(body["blog_posts"], 3);
        assert_eq!(body["pages"], 5);

        let (_, posts) = app.get("/api/blog/posts?status=published").await;
        assert_eq!(posts.as_array().unwrap().len(), 3);

        let (_, again) = app.post("/api/seed", serde_json::json!({})).await;
        assert_eq!(again["message"], "Data already seeded");
        assert!(again.get("blog_posts").is_none());
        let (_, faqs) = app.get("/api/faqs").await;
        assert_eq!(faqs.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_seeded_system_pages_are_protected() {
        let app = TestApp::new();
        app.post("/api/seed/pages-menus", serde_json::json!({})).await;

        let (status, home) = app.get("/api/pages/slug/home").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(home["is_system_page"], true);

        let (status, body) = app
            .delete(&format!("/api/pages/{}", home["id"].as_str().unwrap()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "System pages cannot be deleted");
    }

    #[tokio::test]
    async fn test_pages_menus_seed_skips_existing_collections() {
        let app = TestApp::new();
        app.post(
            "/api/menus",
            serde_json::json!({"name": "custom"}),
        )
        .await;

        let (_, body) = app.post("/api/seed/pages-menus", serde_json::json!({})).await;
        assert_eq!(body["pages"], 5);
        assert_eq!(body["menus"], 0);

        let (_, body) = app.post("/api/seed/pages-menus", serde_json::json!({})).await;
        assert_eq!(body["pages"], 0);

        let (status, _) = app.get("/api/menus/header").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
