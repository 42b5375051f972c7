//! End-to-end checks of the public site over HTTP.

use housing_catalog::config::Settings;
use housing_catalog::db::listings;
use housing_catalog::models::{Category, Location, NewListing, Price, PublicationState};
use housing_catalog::web::{router, AppState};
use scraper::{Html, Selector};
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestSite {
    base: String,
    state: AppState,
    _dir: TempDir,
}

impl TestSite {
    async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    async fn start_with(configure: impl FnOnce(&mut Settings)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.database.path = dir.path().join("catalog.sqlite3");
        settings.media.root = dir.path().join("media");
        configure(&mut settings);

        let state = AppState::from_settings(settings).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            state,
            _dir: dir,
        }
    }

    async fn add(&self, listing: NewListing) -> i64 {
        self.state
            .db
            .call(move |conn| listings::insert_listing(conn, &listing))
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> (u16, String) {
        let response = reqwest::get(format!("{}{}", self.base, path)).await.unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }

    async fn page(&self, path: &str) -> Html {
        let (status, body) = self.get(path).await;
        assert_eq!(status, 200, "GET {path}");
        Html::parse_document(&body)
    }
}

fn listing(title: &str, category: Category, locality: &str) -> NewListing {
    NewListing {
        title: title.to_string(),
        category,
        location: Location {
            address: "Calle 10".into(),
            locality: locality.into(),
            region: "Buenos Aires".into(),
            ..Location::default()
        },
        state: PublicationState::Published,
        ..NewListing::default()
    }
}

fn select<'a>(doc: &'a Html, css: &str) -> Vec<scraper::ElementRef<'a>> {
    let selector = Selector::parse(css).unwrap();
    doc.select(&selector).collect()
}

fn titles(doc: &Html) -> Vec<String> {
    select(doc, ".listing-card .card-title")
        .iter()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .collect()
}

fn chip_keys(doc: &Html) -> Vec<String> {
    select(doc, ".chip")
        .iter()
        .filter_map(|e| e.value().attr("data-key").map(str::to_string))
        .collect()
}

#[tokio::test]
async fn informal_terms_and_locality_narrow_results() {
    let site = TestSite::start().await;
    site.add(listing("Apartamento moderno", Category::Apartment, "Quilmes"))
        .await;
    site.add(listing("Apartamento luminoso", Category::Apartment, "Bernal"))
        .await;
    site.add(listing("Casa con parque", Category::House, "Quilmes"))
        .await;

    let doc = site.page("/propiedades/busqueda/?q=depto&localidad=quilmes").await;
    assert_eq!(titles(&doc), vec!["Apartamento moderno"]);
    assert_eq!(chip_keys(&doc), vec!["q", "localidad"]);
}

#[tokio::test]
async fn removing_a_chip_keeps_the_other_filters() {
    let site = TestSite::start().await;
    site.add(listing("Apartamento moderno", Category::Apartment, "Quilmes"))
        .await;
    site.add(listing("Apartamento luminoso", Category::Apartment, "Bernal"))
        .await;

    let doc = site.page("/propiedades/busqueda/?q=depto&localidad=quilmes").await;
    let link = select(&doc, ".chip[data-key=localidad] a")[0]
        .value()
        .attr("href")
        .unwrap()
        .to_string();
    assert_eq!(link, "/propiedades/busqueda/?q=depto");

    let doc = site.page(&link).await;
    assert_eq!(chip_keys(&doc), vec!["q"]);
    assert_eq!(titles(&doc).len(), 2);
}

#[tokio::test]
async fn no_criteria_shows_the_prompt_instead_of_results() {
    let site = TestSite::start().await;
    site.add(listing("Casa", Category::House, "Bernal")).await;

    for path in [
        "/propiedades/busqueda/",
        "/propiedades/busqueda/?q=%20%20&dormitorios=muchos&page=2",
        "/propiedades/busqueda/?q=%CC%81&localidad=%CC%88",
    ] {
        let doc = site.page(path).await;
        assert_eq!(select(&doc, ".no-filters").len(), 1, "{path}");
        assert!(titles(&doc).is_empty());
        assert!(chip_keys(&doc).is_empty());
    }
}

#[tokio::test]
async fn misspelled_query_falls_back_to_similar_titles() {
    let site = TestSite::start().await;
    site.add(listing("Casa", Category::House, "Bernal")).await;
    site.add(listing("Casa en zona céntrica", Category::House, "Bernal"))
        .await;

    let doc = site.page("/propiedades/busqueda/?q=cassa").await;
    assert_eq!(titles(&doc), vec!["Casa"]);
    assert_eq!(chip_keys(&doc), vec!["q", "fuzzy"]);
    assert_eq!(select(&doc, ".fuzzy-notice").len(), 1);
}

#[tokio::test]
async fn fuzzy_fallback_ignores_other_filters_by_default() {
    let site = TestSite::start().await;
    site.add(listing("Casa", Category::House, "Bernal")).await;
    site.add(listing("Casita", Category::Apartment, "Bernal")).await;

    let doc = site.page("/propiedades/busqueda/?q=cassa&tipo=apartamento").await;
    assert_eq!(titles(&doc), vec!["Casa", "Casita"]);
    assert_eq!(chip_keys(&doc), vec!["q", "tipo", "fuzzy"]);
}

#[tokio::test]
async fn fuzzy_fallback_can_keep_other_filters() {
    let site = TestSite::start_with(|s| s.search.fuzzy_keeps_filters = true).await;
    site.add(listing("Casa", Category::House, "Bernal")).await;
    site.add(listing("Casita", Category::Apartment, "Bernal")).await;

    let doc = site.page("/propiedades/busqueda/?q=cassa&tipo=apartamento").await;
    assert_eq!(titles(&doc), vec!["Casita"]);
    assert_eq!(chip_keys(&doc), vec!["q", "tipo", "fuzzy"]);
}

#[tokio::test]
async fn out_of_range_page_shows_the_last_one() {
    let site = TestSite::start().await;
    for i in 0..30 {
        site.add(listing(&format!("Casa {i}"), Category::House, "Quilmes"))
            .await;
    }

    let doc = site.page("/propiedades/busqueda/?localidad=quilmes&page=999").await;
    assert_eq!(titles(&doc).len(), 6);
    let current = select(&doc, ".pagination .current")[0]
        .text()
        .collect::<String>();
    assert_eq!(current.trim(), "Página 3 de 3");

    let prev = select(&doc, ".pagination .prev")[0]
        .value()
        .attr("href")
        .unwrap()
        .to_string();
    assert_eq!(prev, "/propiedades/busqueda/?localidad=quilmes&page=2");
}

#[tokio::test]
async fn usd_range_excludes_listings_priced_in_pesos() {
    let site = TestSite::start().await;
    let mut usd = listing("Casa en dólares", Category::House, "Quilmes");
    usd.price = Price { usd: Some(100_000.0), ars: None };
    let mut ars = listing("Casa en pesos", Category::House, "Quilmes");
    ars.price = Price { usd: None, ars: Some(120_000.0) };
    let mut pricey = listing("Casa cara", Category::House, "Quilmes");
    pricey.price = Price { usd: Some(300_000.0), ars: None };
    site.add(usd).await;
    site.add(ars).await;
    site.add(pricey).await;

    let doc = site
        .page("/propiedades/busqueda/?currency=usd&price_min=50.000&price_max=200k")
        .await;
    assert_eq!(titles(&doc), vec!["Casa en dólares"]);
    let chip = select(&doc, ".chip[data-key=price_range]")[0]
        .text()
        .collect::<String>();
    assert!(chip.contains("USD 50.000–200.000"), "{chip}");

    let doc = site.page("/propiedades/busqueda/?currency=USD").await;
    let mut found = titles(&doc);
    found.sort();
    assert_eq!(found, vec!["Casa cara", "Casa en dólares"]);
    assert_eq!(chip_keys(&doc), vec!["currency"]);
}

#[tokio::test]
async fn unpublished_listings_stay_hidden() {
    let site = TestSite::start().await;
    let visible = site
        .add(listing("Apartamento moderno", Category::Apartment, "Quilmes"))
        .await;
    let mut draft = listing("Apartamento borrador", Category::Apartment, "Quilmes");
    draft.state = PublicationState::Draft;
    draft.featured = true;
    let draft = site.add(draft).await;
    let mut archived = listing("Apartamento archivado", Category::Apartment, "Quilmes");
    archived.state = PublicationState::Archived;
    site.add(archived).await;

    let doc = site.page("/propiedades/busqueda/?q=apartamento").await;
    assert_eq!(titles(&doc), vec!["Apartamento moderno"]);

    let doc = site.page("/propiedades/").await;
    assert_eq!(titles(&doc), vec!["Apartamento moderno"]);

    let doc = site.page("/").await;
    assert!(titles(&doc).is_empty());

    assert_eq!(site.get(&format!("/propiedades/{visible}/")).await.0, 200);
    assert_eq!(site.get(&format!("/propiedades/{draft}/")).await.0, 404);
}

#[tokio::test]
async fn home_shows_featured_listings() {
    let site = TestSite::start().await;
    let mut featured = listing("Casa quinta con pileta", Category::House, "Ezpeleta");
    featured.featured = true;
    site.add(featured).await;
    site.add(listing("Depósito amplio", Category::Storage, "Avellaneda"))
        .await;

    let doc = site.page("/").await;
    assert_eq!(titles(&doc), vec!["Casa quinta con pileta"]);
}

#[tokio::test]
async fn detail_page_and_missing_listings() {
    let site = TestSite::start().await;
    let mut house = listing("Casa quinta con pileta", Category::House, "Ezpeleta");
    house.amenities = "Pileta, Parque".into();
    house.price = Price { usd: Some(185_000.0), ars: None };
    let id = site.add(house).await;
    site.state
        .db
        .call(move |conn| listings::add_gallery_image(conn, id, "propiedades/galeria/1_1.webp", "Frente"))
        .await
        .unwrap();

    let doc = site.page(&format!("/propiedades/{id}/")).await;
    let price = select(&doc, ".detail-price")[0].text().collect::<String>();
    assert_eq!(price.trim(), "USD 185.000");
    assert_eq!(select(&doc, ".amenities li").len(), 2);
    assert_eq!(select(&doc, ".gallery figure").len(), 1);

    assert_eq!(site.get("/propiedades/9999/").await.0, 404);
    assert_eq!(site.get("/propiedades/abc/").await.0, 404);
    assert_eq!(site.get("/no/existe").await.0, 404);
}

#[tokio::test]
async fn contact_form_is_prefilled_from_listing() {
    let site = TestSite::start_with(|s| s.contact.emailjs_public_key = "pk_test".into()).await;
    let mut house = listing("Casa quinta con pileta", Category::House, "Ezpeleta");
    house.description = "x".repeat(500);
    let id = site.add(house).await;

    let doc = site.page(&format!("/contacto/?propiedad_id={id}")).await;
    let subject = select(&doc, "#contact-subject")[0]
        .value()
        .attr("value")
        .unwrap()
        .to_string();
    assert_eq!(
        subject,
        format!("Consulta por PROP-{id:05} - Casa quinta con pileta")
    );
    let message = select(&doc, "#contact-message")[0]
        .text()
        .collect::<String>();
    assert!(message.contains("Precio: A consultar"));
    assert!(message.contains("Localidad: Ezpeleta"));
    assert!(message.contains(&format!("{}…", "x".repeat(400))));
    assert!(!message.contains(&"x".repeat(401)));

    let (status, body) = site.get("/contacto/").await;
    assert_eq!(status, 200);
    assert!(body.contains("pk_test"));
    let doc = Html::parse_document(&body);
    assert_eq!(select(&doc, "#contact-message")[0].text().collect::<String>(), "");

    let doc = site.page("/contacto/?propiedad_id=abc").await;
    assert!(select(&doc, ".contact-about").is_empty());
}

#[tokio::test]
async fn contact_for_unknown_listing_is_not_found() {
    let site = TestSite::start().await;
    let mut draft = listing("Casa en borrador", Category::House, "Bernal");
    draft.state = PublicationState::Draft;
    let draft = site.add(draft).await;

    assert_eq!(site.get("/contacto/?propiedad_id=9999").await.0, 404);
    assert_eq!(site.get(&format!("/contacto/?propiedad_id={draft}")).await.0, 404);
    assert_eq!(site.get("/contacto/?propiedad_id=").await.0, 200);
}

#[tokio::test]
async fn media_files_are_served_from_storage() {
    let site = TestSite::start().await;
    let name = site
        .state
        .storage
        .save("propiedades/imagenes_principal/1_principal.webp", b"RIFFdemo")
        .await
        .unwrap();

    let response = reqwest::get(format!("{}/media/{}", site.base, name))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/webp"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"RIFFdemo");

    assert_eq!(site.get("/media/propiedades/galeria/none.webp").await.0, 404);
}

#[tokio::test]
async fn health_reports_published_count() {
    let site = TestSite::start().await;
    site.add(listing("Casa", Category::House, "Bernal")).await;
    let mut draft = listing("Borrador", Category::House, "Bernal");
    draft.state = PublicationState::Draft;
    site.add(draft).await;

    let body: serde_json::Value = reqwest::get(format!("{}/health", site.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["published_listings"], 1);
}
