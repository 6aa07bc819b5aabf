use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use tempfile::TempDir;

use super::{TransformConfig, TransformError, Transformer};
use crate::asset::source::test_server::{local_client, serve_once};
use crate::asset::{AssetSource, DefaultSource, FileSource, HttpSource};
use crate::image::{Dimensions, ImageProbe, ProbeError, RasterProbe, Rgb};

/// Counts calls into the real probe.
#[derive(Default)]
struct CountingProbe {
    dimensions: AtomicUsize,
    colors: AtomicUsize,
}

#[async_trait]
impl ImageProbe for CountingProbe {
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        self.dimensions.fetch_add(1, Ordering::SeqCst);
        RasterProbe.dimensions(path).await
    }

    async fn dominant_color(&self, path: &Path) -> Result<Rgb, ProbeError> {
        self.colors.fetch_add(1, Ordering::SeqCst);
        RasterProbe.dominant_color(path).await
    }
}

struct Fixture {
    dir: TempDir,
    probe: Arc<CountingProbe>,
    transformer: Transformer,
}

impl Fixture {
    /// Project with `src/a.png` (100x50, solid rgb(40, 120, 200)).
    fn new() -> Self {
        Self::with_source(Arc::new(FileSource))
    }

    fn with_source(source: Arc<dyn AssetSource>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        RgbImage::from_pixel(100, 50, image::Rgb([40, 120, 200]))
            .save_with_format(dir.path().join("src/a.png"), ImageFormat::Png)
            .unwrap();

        let config = TransformConfig {
            root: dir.path().join("public"),
            public_dir: dir.path().join("public"),
            ..TransformConfig::default()
        };
        let probe = Arc::new(CountingProbe::default());
        let transformer = Transformer::with_parts(config, source, probe.clone());
        Self {
            dir,
            probe,
            transformer,
        }
    }

    fn id(&self) -> String {
        self.module_path().to_string_lossy().into_owned()
    }

    fn module_path(&self) -> PathBuf {
        self.dir.path().join("src/App.tsx")
    }

    async fn run(&self, code: &str) -> String {
        self.transformer
            .transform(code, &self.id())
            .await
            .unwrap()
            .expect("module should change")
            .code
    }
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[tokio::test]
async fn no_placeholder_is_no_change() {
    let fx = Fixture::new();
    let code = "export const A = () => <img src=\"a.png\" />;\n";
    assert!(fx.transformer.transform(code, &fx.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn unhandled_ids_are_no_change() {
    let fx = Fixture::new();
    let code = "const a = <Sim src=\"a.png\" />;";

    for id in [
        "/app/node_modules/lib/index.jsx",
        "/app/src/styles.css",
        "/app/src/App.tsx?v=1",
    ] {
        assert!(fx.transformer.transform(code, id).await.unwrap().is_none(), "{id}");
    }
    assert_eq!(fx.probe.dimensions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn intrinsic_size_and_default_url() {
    let fx = Fixture::new();
    let out = fx.run("export const A = () => <Sim src=\"a.png\" />;\n").await;

    assert!(out.contains("src=\"/Simg/a/a.png\""), "{out}");
    assert!(out.contains("width={100}"), "{out}");
    assert!(out.contains("height={50}"), "{out}");
    assert!(out.contains("color={\"rgb(40, 120, 200)\"}"), "{out}");
    assert!(fx.dir.path().join("public/Simg/a/a.png").exists());
}

#[tokio::test]
async fn remote_source_is_downloaded_and_persisted() {
    let fx = Fixture::with_source(Arc::new(DefaultSource::new(HttpSource::new(local_client()))));
    let png = std::fs::read(fx.dir.path().join("src/a.png")).unwrap();
    let (base, server) = serve_once("200 OK", png.clone());

    let code = format!("const a = <Sim src=\"{base}/img/a.png?v=2\" width={{50}} />;");
    let out = fx.run(&code).await;

    assert_eq!(server.join().unwrap(), "GET /img/a.png?v=2 HTTP/1.1");
    assert!(out.contains("src=\"/Simg/a/a-50x25.png\""), "{out}");
    assert!(out.contains("height={25}"), "{out}");
    assert_eq!(std::fs::read(fx.dir.path().join("public/Simg/a/a.png")).unwrap(), png);
}

#[tokio::test]
async fn remote_error_status_leaves_element_untouched() {
    let fx = Fixture::with_source(Arc::new(DefaultSource::new(HttpSource::new(local_client()))));
    let (base, server) = serve_once("404 Not Found", Vec::new());

    let code = format!(
        "const a = <div><Sim src=\"{base}/missing.png\" /><Sim src=\"a.png\" /></div>;"
    );
    let out = fx.run(&code).await;
    server.join().unwrap();

    assert!(out.contains(&format!("src=\"{base}/missing.png\"")), "{out}");
    assert!(out.contains("src=\"/Simg/a/a.png\""), "{out}");
    assert_eq!(count(&out, "width="), 1, "{out}");
    assert!(!fx.dir.path().join("public/Simg/missing").exists());
}

#[tokio::test]
async fn negative_string_size_is_replaced() {
    let fx = Fixture::new();
    let out = fx.run("const a = <Sim src=\"a.png\" width=\"-100\" />;").await;

    assert!(out.contains("src=\"/Simg/a/a.png\""), "{out}");
    assert!(out.contains("width={100}"), "{out}");
    assert!(out.contains("height={50}"), "{out}");
    assert!(!out.contains("-100"), "{out}");
}

#[tokio::test]
async fn width_only_keeps_aspect_ratio() {
    let fx = Fixture::new();
    let out = fx.run("const a = <Sim src=\"a.png\" width={200} />;").await;

    assert!(out.contains("src=\"/Simg/a/a-200x100.png\""), "{out}");
    assert!(out.contains("height={100}"), "{out}");
    assert_eq!(count(&out, "width="), 1, "{out}");
    // the dimensioned variant is addressed, not written
    assert!(!fx.dir.path().join("public/Simg/a/a-200x100.png").exists());
}

#[tokio::test]
async fn both_sizes_skip_dimension_probe() {
    let fx = Fixture::new();
    let out = fx
        .run("const a = <Sim src=\"a.png\" width={200} height={150} />;")
        .await;

    assert!(out.contains("src=\"/Simg/a/a-200x150.png\""), "{out}");
    assert!(out.contains("width={200}"), "{out}");
    assert!(out.contains("height={150}"), "{out}");
    assert_eq!(fx.probe.dimensions.load(Ordering::SeqCst), 0);
    assert_eq!(fx.probe.colors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn query_string_stays_out_of_asset_name() {
    let fx = Fixture::new();
    let out = fx.run("const a = <Sim src=\"a.png?v=2\" />;").await;

    assert!(out.contains("src=\"/Simg/a/a.png\""), "{out}");
    assert!(!out.contains("v=2"), "{out}");
}

#[tokio::test]
async fn existing_attributes_are_updated_in_place() {
    let fx = Fixture::new();
    let out = fx
        .run("const a = <Sim width=\"50\" src=\"a.png\" alt=\"hero\" />;")
        .await;

    assert_eq!(count(&out, "width="), 1, "{out}");
    assert!(out.contains("width={50}"), "{out}");
    assert!(out.contains("height={25}"), "{out}");
    assert!(out.contains("alt=\"hero\""), "{out}");
    // width keeps its position ahead of src
    assert!(out.find("width=").unwrap() < out.find("src=").unwrap(), "{out}");
}

#[tokio::test]
async fn failed_element_does_not_block_siblings() {
    let fx = Fixture::new();
    let out = fx
        .run("const a = <><Sim src=\"missing.png\" /><Sim src=\"a.png\" /></>;")
        .await;

    assert!(out.contains("src=\"missing.png\""), "{out}");
    assert!(out.contains("src=\"/Simg/a/a.png\""), "{out}");
    assert_eq!(count(&out, "width="), 1, "{out}");
    assert_eq!(count(&out, "color="), 1, "{out}");
}

#[tokio::test]
async fn only_failures_is_no_change() {
    let fx = Fixture::new();
    let code = "const a = <Sim src=\"missing.png\" />;";
    assert!(fx.transformer.transform(code, &fx.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn second_run_does_not_duplicate_attributes() {
    let fx = Fixture::new();
    let first = fx.run("const a = <Sim src=\"a.png\" />;").await;

    // `/Simg/a/a.png` now resolves against the public dir
    let second = fx.run(&first).await;
    assert_eq!(count(&second, "width="), 1, "{second}");
    assert_eq!(count(&second, "height="), 1, "{second}");
    assert_eq!(count(&second, "color="), 1, "{second}");
    // both sizes are explicit now, so the URL switches to the dimensioned form
    assert!(second.contains("src=\"/Simg/a/a-100x50.png\""), "{second}");
}

#[tokio::test]
async fn nested_placeholders_are_all_rewritten() {
    let fx = Fixture::new();
    let out = fx
        .run("const a = <Sim src=\"a.png\"><Sim src=\"./a.png\" height={10} /></Sim>;")
        .await;

    assert!(out.contains("src=\"/Simg/a/a.png\""), "{out}");
    assert!(out.contains("src=\"/Simg/a/a-20x10.png\""), "{out}");
    assert_eq!(count(&out, "color="), 2, "{out}");
}

#[tokio::test]
async fn surrounding_code_survives() {
    let fx = Fixture::new();
    let out = fx
        .run(
            "import { Sim } from \"simg\";\n\
             export function Hero({ title }: { title: string }) {\n\
               return <section><h1>{title}</h1><Sim src=\"a.png\" /></section>;\n\
             }\n",
        )
        .await;

    assert!(out.contains("import { Sim } from \"simg\""), "{out}");
    assert!(out.contains("export function Hero"), "{out}");
    assert!(out.contains("<h1>{title}</h1>"), "{out}");
}

#[tokio::test]
async fn emits_source_map() {
    let fx = Fixture::new();
    let output = fx
        .transformer
        .transform("const a = <Sim src=\"a.png\" />;", &fx.id())
        .await
        .unwrap()
        .unwrap();

    let map = output.map.expect("source map");
    assert!(map.contains("\"mappings\""), "{map}");
    assert!(map.contains("App.tsx"), "{map}");
}

#[tokio::test]
async fn parse_error_is_module_fatal() {
    let fx = Fixture::new();
    let err = fx
        .transformer
        .transform("const a = <Sim src=\"a.png\" ;", &fx.id())
        .await
        .unwrap_err();

    let TransformError::Parse { id, message } = err;
    assert_eq!(id, fx.id());
    assert!(!message.is_empty());
    assert_eq!(fx.probe.colors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn custom_tag_and_namespace() {
    let dir = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(4, 2, image::Rgb([0, 0, 0]))
        .save_with_format(dir.path().join("logo.png"), ImageFormat::Png)
        .unwrap();

    let config = TransformConfig {
        root: dir.path().to_path_buf(),
        public_dir: dir.path().join("dist"),
        namespace: "img".into(),
        tag: "Picture".into(),
        exclude: vec![],
    };
    let transformer = Transformer::new(config);
    let id = dir.path().join("page.jsx").to_string_lossy().into_owned();
    let out = transformer
        .transform("const a = <><Sim src=\"/logo.png\" /><Picture src=\"/logo.png\" /></>;", &id)
        .await
        .unwrap()
        .unwrap()
        .code;

    assert!(out.contains("<Sim src=\"/logo.png\""), "{out}");
    assert!(out.contains("src=\"/img/logo/logo.png\""), "{out}");
    assert!(out.contains("color={\"rgb(8, 8, 8)\"}"), "{out}");
    assert!(dir.path().join("dist/img/logo/logo.png").exists());
}
