use carousel_forge::{
    CpuRenderer, FitMode, FontBook, SlideRecord, TemplateTag, encode_data_uri,
};

fn renderer(scale: f32) -> CpuRenderer {
    CpuRenderer::new(&FontBook::new(), scale).unwrap()
}

fn png_uri(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> String {
    let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba(f(x, y)));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    encode_data_uri("image/png", &buf)
}

fn near(a: [u8; 4], b: [u8; 4], tol: i16) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (i16::from(*x) - i16::from(*y)).abs() <= tol)
}

#[test]
fn horizontal_gradient_goes_left_to_right() {
    let mut slide = SlideRecord::with_text("g", "", "");
    slide.set_gradient_background("linear-gradient(to right, #000000 0%, #ffffff 100%)");
    let frame = renderer(0.1).render_slide(&slide).unwrap();

    let left = frame.pixel(0, 54).unwrap();
    let mid = frame.pixel(54, 54).unwrap();
    let right = frame.pixel(107, 54).unwrap();
    // The gradient line spans the canvas diagonal, so the edges sit at t ≈ 0.15 and 0.85.
    assert!(near(left, [38, 38, 38, 255], 4), "{left:?}");
    assert!(near(mid, [128, 128, 128, 255], 4), "{mid:?}");
    assert!(near(right, [217, 217, 217, 255], 4), "{right:?}");
    // Constant along the vertical axis.
    assert_eq!(frame.pixel(54, 0), frame.pixel(54, 107));
}

#[test]
fn scale_two_doubles_resolution_with_same_layout() {
    let mut slide = SlideRecord::with_text("g", "", "");
    slide.set_gradient_background("linear-gradient(to right, #000000, #ffffff)");
    let one = renderer(0.05).render_slide(&slide).unwrap();
    let two = renderer(0.1).render_slide(&slide).unwrap();
    assert_eq!((two.width, two.height), (one.width * 2, one.height * 2));
    assert!(near(
        one.pixel(27, 27).unwrap(),
        two.pixel(54, 54).unwrap(),
        6
    ));
}

#[test]
fn cover_image_fills_the_canvas() {
    // Left half red, right half blue, 2:1 aspect.
    let uri = png_uri(40, 20, |x, _| {
        if x < 20 {
            [255, 0, 0, 255]
        } else {
            [0, 0, 255, 255]
        }
    });
    let mut slide = SlideRecord::with_text("i", "", "");
    slide.set_image_background(uri);
    slide.image_fit = FitMode::Cover;
    slide.template = TemplateTag::Classic;

    let frame = renderer(0.1).render_slide(&slide).unwrap();
    for x in [0, 107] {
        for y in [0, 107] {
            assert_eq!(frame.pixel(x, y).unwrap()[3], 255);
        }
    }
    let left = frame.pixel(20, 54).unwrap();
    let right = frame.pixel(88, 54).unwrap();
    assert!(left[0] > left[2], "{left:?}");
    assert!(right[2] > right[0], "{right:?}");
}

#[test]
fn contain_image_letterboxes_with_flat_color() {
    let uri = png_uri(40, 10, |_, _| [0, 255, 0, 255]);
    let mut slide = SlideRecord::with_text("i", "", "");
    slide.background_color = Some("#0000ff".into());
    slide.set_image_background(uri);
    slide.image_fit = FitMode::Contain;

    let frame = renderer(0.1).render_slide(&slide).unwrap();
    let top = frame.pixel(54, 2).unwrap();
    let middle = frame.pixel(54, 54).unwrap();
    assert!(top[2] > top[1], "letterbox should show the flat color: {top:?}");
    assert!(middle[1] > middle[2], "image should cover the middle band: {middle:?}");
}

#[test]
fn noir_template_renders_grayscale() {
    let mut slide = SlideRecord::with_text("n", "", "");
    slide.set_color_background("#cc3366");
    slide.template = TemplateTag::Noir;
    let frame = renderer(0.05).render_slide(&slide).unwrap();
    let [r, g, b, _] = frame.pixel(10, 10).unwrap();
    assert_eq!(r, g);
    assert_eq!(g, b);
}

#[test]
fn unparsable_gradient_falls_back_to_flat_color() {
    let mut slide = SlideRecord::with_text("g", "", "");
    slide.background_color = Some("#336699".into());
    slide.set_gradient_background("radial-gradient(circle, red, blue)");
    let frame = renderer(0.05).render_slide(&slide).unwrap();
    assert_eq!(frame.pixel(5, 5), Some([0x33, 0x66, 0x99, 255]));
}
