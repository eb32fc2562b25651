use std::path::PathBuf;

use carousel_forge::SlideRecord;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_carousel")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "carousel.exe"
            } else {
                "carousel"
            });
            p
        })
}

#[test]
fn cli_render_writes_pngs_and_zip() {
    let dir = PathBuf::from("target").join("cli_smoke");
    let out_dir = dir.join("out");
    let _ = std::fs::remove_dir_all(&out_dir);
    std::fs::create_dir_all(&dir).unwrap();

    let mut a = SlideRecord::with_text("a", "", "");
    a.set_color_background("#ff8800");
    let mut b = SlideRecord::with_text("b", "", "");
    b.set_gradient_background("linear-gradient(to right, red, blue)");

    let in_path = dir.join("slides.json");
    let f = std::fs::File::create(&in_path).unwrap();
    serde_json::to_writer_pretty(f, &serde_json::json!({ "slides": [a, b] })).unwrap();

    let zip_path = out_dir.join("carousel.zip");
    let status = std::process::Command::new(exe())
        .args(["render", "--in"])
        .arg(&in_path)
        .arg("--out-dir")
        .arg(&out_dir)
        .arg("--zip")
        .arg(&zip_path)
        .args(["--scale", "0.1"])
        .env_remove("CAROUSEL_FONT")
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_dir.join("slide-01.png").exists());
    assert!(out_dir.join("slide-02.png").exists());
    assert!(zip_path.exists());

    let png = image::open(out_dir.join("slide-01.png")).unwrap().to_rgba8();
    assert_eq!(png.dimensions(), (108, 108));
    assert_eq!(png.get_pixel(50, 50).0, [255, 136, 0, 255]);
}

#[test]
fn cli_slides_add_and_delete_persist() {
    let dir = PathBuf::from("target").join("cli_slides");
    std::fs::create_dir_all(&dir).unwrap();
    let state = dir.join("state.json");
    let _ = std::fs::remove_file(&state);

    let run = |args: &[&str]| {
        let out = std::process::Command::new(exe())
            .arg("slides")
            .arg("--state")
            .arg(&state)
            .args(args)
            .output()
            .unwrap();
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        String::from_utf8(out.stdout).unwrap()
    };

    let listed = run(&["add", "--title", "Hello"]);
    assert!(listed.contains("Slide 1"));
    assert!(listed.contains("Hello"));

    let listed = run(&["delete", "--id", "slide-1"]);
    assert!(!listed.contains("Slide 1"));
    assert!(listed.contains("Hello"));

    let listed = run(&["list"]);
    assert_eq!(listed.lines().count(), 1);
}
