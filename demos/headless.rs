use kibana_map::{
    engine::headless::LoadMode, BaseLayerConfig, HeadlessEngine, KibanaMap, KibanaMapOptions,
    LatLng, MountPoint, OverlayLayer,
};

/// Example of driving a kibana-map widget without any UI
fn main() -> kibana_map::Result<()> {
    kibana_map::init_logging();

    println!("Kibana map headless example");
    println!("===========================");

    let mount = MountPoint::new(1024.0, 768.0);
    let engine = HeadlessEngine::with_load_mode(LoadMode::Immediate);
    let options = KibanaMapOptions::from_json(
        r#"{"minZoom": 1, "maxZoom": 10, "center": [37.7749, -122.4194], "zoom": 0}"#,
    )?;
    let mut map = KibanaMap::new(mount.clone(), Box::new(engine.clone()), options)?;

    println!("Map created:");
    println!("   Center: {:.4}, {:.4}", map.center().lat, map.center().lon);
    println!("   Zoom: {}", map.zoom_level());
    println!("   Bounds: {:?}", map.bounds());

    map.on("baseLayer:loaded", |event| println!("   -> {}", event.name()));
    map.on("zoomchange", |event| println!("   -> {:?}", event));

    let base_layer = BaseLayerConfig::from_json(
        r#"{
            "baseLayerType": "tms",
            "options": {
                "url": "https://tiles.maps.elastic.co/v2/default/{z}/{x}/{y}.png",
                "minZoom": 0,
                "maxZoom": 10,
                "attribution": "Elastic Maps Service"
            }
        }"#,
    )?;
    map.set_base_layer(Some(base_layer));
    map.process_events();
    println!("Base layer: {:?}", map.base_layer_state());
    if let Some(source) = engine.current_base_layer() {
        println!("   Tile 0/0/0: {}", source.tile_url(0, 0, 0));
    }

    map.add_layer(Box::new(
        OverlayLayer::new("geohash_grid").with_attribution("OpenStreetMap contributors|Elastic"),
    ))?;
    println!("Attribution: {}", mount.attribution_text());

    println!("\nNavigating:");
    let locations = [
        ("New York", LatLng::new(40.7128, -74.0060), 6.0),
        ("London", LatLng::new(51.5074, -0.1278), 5.4),
        ("Tokyo", LatLng::new(35.6762, 139.6503), 12.0),
    ];
    for (name, location, zoom) in locations {
        map.set_center(location);
        map.set_zoom_level(zoom);
        map.process_events();
        println!(
            "   {} at zoom {} ({:.1} m/px)",
            name,
            map.zoom_level(),
            map.meters_per_pixel()
        );
    }

    mount.set_size(512.0, 512.0);
    map.resize();
    println!("\nResized, bounds now {:?}", map.bounds());

    map.destroy();
    println!("Map destroyed, engine mounted: {}", engine.is_mounted());
    Ok(())
}
