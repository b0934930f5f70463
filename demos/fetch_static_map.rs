use staticmap::{ClientConfig, LatLng, MapType, StaticMapClient, StaticMapOptions};

/// Fetch a static map and write it next to the working directory.
///
/// Usage: `GOOGLE_MAPS_API_KEY=... cargo run --example fetch_static_map [out.png]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let out = std::env::args().nth(1).unwrap_or_else(|| "static_map.png".to_string());

    let mut config = ClientConfig::default();
    if let Ok(key) = std::env::var("GOOGLE_MAPS_API_KEY") {
        config = config.with_api_key(key);
    }
    let client = StaticMapClient::with_config(config);

    let options = StaticMapOptions::new()
        .center(LatLng::new(43.653226, -79.3831843))
        .maptype(MapType::Roadmap)
        .style("feature:landscape|hue:0xFF00FF|saturation:100|lightness:-50");

    let image = client
        .load_with_callback(&options, |outcome| match outcome {
            Ok(image) => println!("loaded {}x{} map", image.width, image.height),
            Err(e) => eprintln!("failed: {}", e),
        })
        .await?;

    std::fs::write(&out, &image.bytes)?;
    println!("wrote {} ({} bytes)", out, image.bytes.len());

    Ok(())
}
