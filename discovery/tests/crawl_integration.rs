use command_tree_core::{Args, DuplicatePolicy, validate_bundle};
use command_tree_discovery::{CrawlConfig, CrawlError, Crawler, HttpConfig, HttpPageSource, PageSource};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASE: &str = r#"<html><head><title>Release Azure CLI 2.61.0 · Azure/azure-cli</title></head></html>"#;

const INDEX: &str = r#"<html><body>
  <h1>Azure CLI reference</h1>
  <table>
    <tr><td><a href="az/webapp">az webapp</a></td><td>Manage web apps.</td></tr>
    <tr><td><a href="az/ml-v1">az ml (v1)</a></td><td>Manage Azure Machine Learning resources (v1).</td></tr>
    <tr><td><a href="az/ml">az ml</a></td><td>Manage Azure Machine Learning resources (v2).</td></tr>
    <tr><td><a href="reference-index#az-find">az find</a></td><td>Find commands.</td></tr>
  </table>

  <div class="heading-wrapper"><h2 id="az-find">az find</h2></div>
  <p>I'm an AI robot, my advice is based on our Azure documentation.</p>
  <h3 id="az-find-required-parameters">Required Parameters</h3>
  <div class="parameterName">&lt;CLI_TERM&gt;</div>
  <div class="parameterInfo"><p>An Azure CLI command or group for which you need an example.</p></div>

  <details><summary>Global Parameters</summary>
    <div class="parameterName">--debug</div>
    <div class="parameterInfo"><p>Increase logging verbosity to show all debug logs.</p></div>
    <div class="parameterName">--output -o</div>
    <div class="parameterInfo"><p>Output format. Accepted values: json, jsonc, table, tsv, yaml. Default value: json.</p></div>
  </details>
</body></html>"#;

const WEBAPP: &str = r#"<html><body>
  <h1>az webapp</h1>
  <p>Manage web apps.</p>
  <table>
    <tr><td><a href="webapp#az-webapp-create">az webapp create</a></td><td>Create a web app.</td></tr>
    <tr><td><a href="webapp/auth#az-webapp-auth-apple">az webapp auth apple</a></td><td>Apple.</td></tr>
    <tr><td><a href="webapp/auth#az-webapp-auth-show">az webapp auth show</a></td><td>Show.</td></tr>
  </table>

  <div class="heading-wrapper"><h2 id="az-webapp-create">az webapp create</h2></div>
  <p>Create a web app.</p>
  <h3 id="az-webapp-create-required-parameters">Required Parameters</h3>
  <div class="parameterName">--name -n</div>
  <div class="parameterInfo"><p>Name of the new web app.</p></div>
  <h3 id="az-webapp-create-optional-parameters">Optional Parameters</h3>
  <div class="parameterName">--output -o</div>
  <div class="parameterInfo"><p>Output format.</p></div>
  <div class="parameterName">--https-only</div>
  <div class="parameterInfo"><p>Redirect all traffic to HTTPS. Accepted values: false, true. Default value: False.</p></div>
</body></html>"#;

const WEBAPP_AUTH: &str = r#"<html><body>
  <h1>az webapp auth (preview)</h1>
  <p>Manage webapp authentication and authorization.</p>

  <div class="heading-wrapper"><h2 id="az-webapp-auth-apple">az webapp auth apple (preview)</h2></div>
  <p>Manage Apple authentication.</p>
  <h3 id="az-webapp-auth-apple-optional-parameters">Optional Parameters</h3>
  <div class="parameterName">--yes -y</div>
  <div class="parameterInfo"><p>Do not prompt for confirmation.</p></div>

  <div class="heading-wrapper"><h2 id="az-webapp-auth-show">az webapp auth show</h2></div>
  <p>Show the authentication settings.</p>
</body></html>"#;

const ML_V1: &str = r#"<html><body>
  <h1>az ml</h1>
  <p>Manage Azure Machine Learning resources (v1).</p>
  <table><tr><td><a href="ml-v1#az-ml-legacy">az ml legacy</a></td><td>Legacy.</td></tr></table>
  <div class="heading-wrapper"><h2 id="az-ml-legacy">az ml legacy</h2></div>
  <p>Legacy command.</p>
</body></html>"#;

const ML_V2: &str = r#"<html><body>
  <h1>az ml</h1>
  <p>Manage Azure Machine Learning resources (v2).</p>
  <table><tr><td><a href="ml#az-ml-job">az ml job</a></td><td>Job.</td></tr></table>
  <div class="heading-wrapper"><h2 id="az-ml-job">az ml job</h2></div>
  <p>Manage jobs.</p>
</body></html>"#;

async fn mount_page(server: &MockServer, route: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(hits)
        .mount(server)
        .await;
}

async fn site() -> MockServer {
    let server = MockServer::start().await;
    mount_page(&server, "/cli/reference-index", INDEX, 1).await;
    mount_page(&server, "/cli/az/webapp", WEBAPP, 1).await;
    mount_page(&server, "/cli/az/webapp/auth", WEBAPP_AUTH, 1).await;
    mount_page(&server, "/cli/az/ml-v1", ML_V1, 1).await;
    mount_page(&server, "/cli/az/ml", ML_V2, 0).await;
    server
}

fn config_for(server: &MockServer) -> CrawlConfig {
    CrawlConfig {
        root_url: format!("{}/cli/reference-index", server.uri()),
        release_url: format!("{}/releases/latest", server.uri()),
        ..CrawlConfig::default()
    }
}

fn crawler(config: CrawlConfig) -> Crawler<HttpPageSource> {
    let source = HttpPageSource::new(&config.http).unwrap();
    Crawler::new(source, config)
}

#[tokio::test]
async fn test_full_crawl_builds_nested_tree() {
    let server = site().await;
    mount_page(&server, "/releases/latest", RELEASE, 1).await;
    let crawler = crawler(config_for(&server));

    let version = crawler.resolve_version().await.unwrap();
    assert_eq!(version, "2.61.0");

    let bundle = crawler.crawl(&version).await.unwrap();
    assert_eq!(bundle.version, "2.61.0");
    assert!(validate_bundle(&bundle).is_empty());

    let names: Vec<_> = bundle.commands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["webapp", "ml", "find"]);

    let webapp = bundle.find_command("webapp").unwrap();
    assert_eq!(webapp.description.as_deref(), Some("Manage web apps."));
    let auth = webapp.find_path(&["auth"]).unwrap();
    assert_eq!(
        auth.description.as_deref(),
        Some("Manage webapp authentication and authorization.")
    );
    assert_eq!(auth.subcommand_names(), vec!["apple", "show"]);
    let apple = auth.find_subcommand("apple").unwrap();
    assert!(apple.find_option("-y").unwrap().argument.is_none());

    let create = webapp.find_subcommand("create").unwrap();
    assert!(create.find_option("--output").is_none());
    assert!(create.find_option("-n").unwrap().is_required);
    assert!(create.find_option("--https-only").unwrap().argument.is_none());
}

#[tokio::test]
async fn test_root_object_lists_stubs_and_globals() {
    let server = site().await;
    let bundle = crawler(config_for(&server)).crawl("2.61.0").await.unwrap();

    let root = &bundle.root;
    assert_eq!(root.name, "az");
    let globals: Vec<_> = root.options.iter().map(|o| o.names.join(" ")).collect();
    assert_eq!(globals, vec!["--debug", "--output -o"]);
    assert!(root.options.iter().all(|o| o.is_persistent));

    let stub = root.find_subcommand("webapp").unwrap();
    assert_eq!(stub.load_spec_ref.as_deref(), Some("az/2.61.0/webapp"));
    assert!(stub.subcommands.is_empty());
    assert!(stub.options.is_empty());
}

#[tokio::test]
async fn test_inline_base_command_from_index_page() {
    let server = site().await;
    let bundle = crawler(config_for(&server)).crawl("2.61.0").await.unwrap();

    let find = bundle.find_command("find").unwrap();
    assert_eq!(find.description.as_deref(), Some("Find commands."));
    match &find.args {
        Some(Args::One(arg)) => {
            assert_eq!(arg.name, "CLI_TERM");
            assert!(!arg.is_optional);
        }
        other => panic!("expected one positional argument, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_base_command_keeps_first_listing() {
    let server = site().await;
    let bundle = crawler(config_for(&server)).crawl("2.61.0").await.unwrap();

    let ml: Vec<_> = bundle.commands.iter().filter(|c| c.name == "ml").collect();
    assert_eq!(ml.len(), 1);
    assert!(ml[0].find_subcommand("legacy").is_some());
    assert!(ml[0].find_subcommand("job").is_none());
    assert_eq!(bundle.root.subcommands.iter().filter(|c| c.name == "ml").count(), 1);
}

#[tokio::test]
async fn test_keep_last_policy_selects_second_listing() {
    let server = MockServer::start().await;
    mount_page(&server, "/cli/reference-index", INDEX, 1).await;
    mount_page(&server, "/cli/az/webapp", WEBAPP, 1).await;
    mount_page(&server, "/cli/az/webapp/auth", WEBAPP_AUTH, 1).await;
    mount_page(&server, "/cli/az/ml-v1", ML_V1, 0).await;
    mount_page(&server, "/cli/az/ml", ML_V2, 1).await;

    let config = CrawlConfig {
        duplicate_policy: DuplicatePolicy::KeepLast,
        ..config_for(&server)
    };
    let bundle = crawler(config).crawl("2.61.0").await.unwrap();

    let names: Vec<_> = bundle.commands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["webapp", "ml", "find"]);
    let ml = bundle.find_command("ml").unwrap();
    assert!(ml.find_subcommand("job").is_some());
}

#[tokio::test]
async fn test_failed_group_page_aborts_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/cli/reference-index", INDEX, 1).await;
    mount_page(&server, "/cli/az/webapp", WEBAPP, 1).await;
    Mock::given(method("GET"))
        .and(path("/cli/az/webapp/auth"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/cli/az/ml-v1", ML_V1, 0).await;

    let err = crawler(config_for(&server)).crawl("2.61.0").await.unwrap_err();
    assert!(err.is_fetch_failure());
    assert!(matches!(err, CrawlError::FetchStatus { status: 404, ref url } if url.ends_with("/cli/az/webapp/auth")));
}

#[tokio::test]
async fn test_release_title_without_version_fails() {
    let server = MockServer::start().await;
    mount_page(&server, "/releases/latest", "<title>Releases</title>", 1).await;

    let err = crawler(config_for(&server)).resolve_version().await.unwrap_err();
    assert!(matches!(err, CrawlError::VersionResolution { ref title, .. } if title == "Releases"));
}

#[tokio::test]
async fn test_http_source_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", "<p>ok</p>", 1).await;

    let source = HttpPageSource::new(&HttpConfig {
        retries: 2,
        retry_delay_ms: 1,
        ..HttpConfig::default()
    })
    .unwrap();
    let url = Url::parse(&format!("{}/flaky", server.uri())).unwrap();

    let page = source.fetch(&url).await.unwrap();
    assert_eq!(page.status, 200);
    assert_eq!(page.body, "<p>ok</p>");
}

#[tokio::test]
async fn test_http_source_without_retries_returns_first_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpPageSource::new(&HttpConfig::default()).unwrap();
    let url = Url::parse(&format!("{}/down", server.uri())).unwrap();
    let page = source.fetch(&url).await.unwrap();
    assert_eq!(page.status, 503);
    assert!(!page.is_success());
}
