//! Integration tests for flow and box layout.
//!
//! Each test feeds a small event stream through a [`Session`] and checks
//! the geometry left in the primitive tree.

use std::rc::Rc;

use numbat_common::Fx;
use numbat_display::{
    DisplayError, DisplayTree, FixedPitchFont, Fit, FontChoice, FontHandle, FontMetrics,
    FontProvider, LayoutRect, Primitive, PrimitiveKind, Size,
};
use numbat_layout::{
    Cursor, ElementStart, Event, LayoutConfig, LayoutError, LayoutStack, Session,
};
use quickcheck_macros::quickcheck;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn px(v: i32) -> Fx {
    Fx::from_whole(v)
}

fn config(width: i32, height: i32) -> LayoutConfig {
    LayoutConfig {
        viewport_width: px(width),
        viewport_height: px(height),
        ..LayoutConfig::default()
    }
}

fn start(tag: &str) -> Event {
    Event::Start(ElementStart::new(tag))
}

fn styled(tag: &str, css: &str) -> Event {
    Event::Start(ElementStart::new(tag).style(css))
}

fn text(t: &str) -> Event {
    Event::Text(t.to_string())
}

fn end(tag: &str) -> Event {
    Event::End(tag.to_string())
}

fn run(session: &mut Session, events: &[Event]) {
    init_logging();
    session.run(events).unwrap();
}

fn texts(tree: &DisplayTree) -> Vec<&Primitive> {
    tree.iter().map(|(_, p)| p).filter(|p| p.is_text()).collect()
}

fn rects(tree: &DisplayTree) -> Vec<&Primitive> {
    tree.iter()
        .map(|(_, p)| p)
        .filter(|p| matches!(p.kind, PrimitiveKind::Rect { .. }))
        .collect()
}

fn root_cursor(session: &Session) -> Cursor {
    session
        .context()
        .stack()
        .get(LayoutStack::ROOT)
        .unwrap()
        .cursor
}

/// Advances every codepoint by 10; vertical metrics by size.
#[derive(Debug)]
struct StubFont {
    ascent: Fx,
    height: Fx,
}

impl FontMetrics for StubFont {
    fn line_height(&self) -> Fx {
        self.height
    }

    fn ascent(&self) -> Fx {
        self.ascent
    }

    fn advance(&self, _ch: char) -> Fx {
        px(10)
    }
}

/// 20px text gets ascent 8, everything else is 16px with ascent 12.
struct StubFonts;

impl FontProvider for StubFonts {
    fn choose(&mut self, choice: &FontChoice) -> FontHandle {
        if choice.fixed_height == px(20) {
            Rc::new(StubFont {
                ascent: px(8),
                height: px(20),
            })
        } else {
            Rc::new(StubFont {
                ascent: px(12),
                height: px(16),
            })
        }
    }
}

/// A font that never fits anything.
#[derive(Debug)]
struct StallingFont;

impl FontMetrics for StallingFont {
    fn line_height(&self) -> Fx {
        px(16)
    }

    fn ascent(&self) -> Fx {
        px(12)
    }

    fn advance(&self, _ch: char) -> Fx {
        px(10)
    }

    fn fit(&self, _text: &str, _max_width: Fx) -> Fit {
        Fit {
            consumed: 0,
            wrapped: true,
            width: Fx::ZERO,
            height: px(16),
        }
    }
}

struct StallingFonts;

impl FontProvider for StallingFonts {
    fn choose(&mut self, _choice: &FontChoice) -> FontHandle {
        Rc::new(StallingFont)
    }
}

/// A font that claims to have taken more text than it was given.
#[derive(Debug)]
struct OverreachingFont;

impl FontMetrics for OverreachingFont {
    fn line_height(&self) -> Fx {
        px(16)
    }

    fn ascent(&self) -> Fx {
        px(12)
    }

    fn advance(&self, _ch: char) -> Fx {
        px(10)
    }

    fn fit(&self, text: &str, max_width: Fx) -> Fit {
        Fit {
            consumed: text.len() + 4,
            wrapped: false,
            width: max_width,
            height: px(16),
        }
    }
}

struct OverreachingFonts;

impl FontProvider for OverreachingFonts {
    fn choose(&mut self, _choice: &FontChoice) -> FontHandle {
        Rc::new(OverreachingFont)
    }
}

#[test]
fn test_single_container_with_text() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[start("div"), text("Hi"), end("div"), Event::Complete],
    );

    let tree = session.tree();
    assert_eq!(tree.len(), 2);

    let rect = rects(tree)[0];
    let text_width = FixedPitchFont::new(px(16), 400).text_width("Hi");
    assert_eq!(rect.bbox.h, px(16));
    assert_eq!(rect.bbox.w, text_width);

    let run = texts(tree)[0];
    assert_eq!(run.bbox.x, Fx::ZERO);
    assert_eq!(run.bbox.y, Fx::ZERO);
    assert!(!run.runon);
    assert_eq!(run.as_text().unwrap().text, "Hi");
    assert_eq!(root_cursor(&session).y, px(16));
}

#[test]
fn test_mixed_sizes_share_a_baseline() {
    let mut session = Session::new(&config(320, 200), Box::new(StubFonts));
    run(
        &mut session,
        &[
            start("div"),
            styled("span", "font-size: 16px"),
            text("A"),
            end("span"),
            styled("span", "font-size: 20px"),
            text("B"),
            end("span"),
            end("div"),
        ],
    );

    let runs = texts(session.tree());
    assert_eq!(runs.len(), 2);
    let (small, large) = (runs[0], runs[1]);
    assert!(!small.runon);
    assert!(large.runon);
    assert_eq!(small.bbox.y - large.bbox.y, px(8));
    for run in [small, large] {
        let text = run.as_text().unwrap();
        assert_eq!(text.group_height, Some(px(20)));
        assert_eq!(text.group_ascent, Some(px(8)));
    }
    // the line is as tall as its tallest box
    assert_eq!(rects(session.tree())[0].bbox.h, px(20));
}

#[test]
fn test_auto_width_is_widest_plus_right_padding() {
    let mut session = Session::new(&config(320, 200), Box::new(StubFonts));
    run(
        &mut session,
        &[
            styled("div", "padding-right: 7px"),
            text("abcdefghijklmn"),
            end("div"),
        ],
    );

    let rect = rects(session.tree())[0];
    assert_eq!(rect.bbox.w, px(147));
}

#[test]
fn test_zero_consumption_is_fatal() {
    init_logging();
    let mut session = Session::new(&config(320, 200), Box::new(StallingFonts));
    session.feed(&start("div")).unwrap();
    let err = session.feed(&text("x")).unwrap_err();
    assert!(matches!(err, LayoutError::NoProgress { offset: 0, len: 1 }));
    assert!(session.is_aborted());

    // nothing after a fatal error is laid out
    let before = session.tree().len();
    session.feed(&end("div")).unwrap();
    session.feed(&text("more")).unwrap();
    assert_eq!(session.tree().len(), before);
}

#[test]
fn test_fit_past_the_text_is_fatal() {
    init_logging();
    let mut session = Session::new(&config(320, 200), Box::new(OverreachingFonts));
    session.feed(&start("div")).unwrap();
    let err = session.feed(&text("héllo")).unwrap_err();
    assert!(matches!(err, LayoutError::NoProgress { offset: 0, len: 6 }));
    assert!(session.is_aborted());
}

#[test]
fn test_center_alignment_shifts_line() {
    let mut session = Session::new(&config(300, 200), Box::new(StubFonts));
    run(
        &mut session,
        &[
            styled("div", "text-align: center"),
            text("0123456789"),
            end("div"),
        ],
    );

    let run = texts(session.tree())[0];
    assert_eq!(run.bbox.x, px(100));
    assert_eq!(run.bbox.w, px(100));
}

#[test]
fn test_right_alignment_shifts_line() {
    let mut session = Session::new(&config(300, 200), Box::new(StubFonts));
    run(
        &mut session,
        &[
            styled("div", "text-align: right"),
            text("0123456789"),
            end("div"),
        ],
    );

    assert_eq!(texts(session.tree())[0].bbox.x, px(200));
}

#[test]
fn test_percent_padding_resolves_against_containing_block() {
    let mut session = Session::new(&config(300, 200), Box::new(StubFonts));
    run(
        &mut session,
        &[
            styled("div", "width: 100px; padding-left: 10%; text-align: center"),
            text("ab"),
            end("div"),
        ],
    );

    // padding 30 of 300; the line uses 50 of 100, so it moves by 30 + 25
    let rect = rects(session.tree())[0];
    assert_eq!(rect.bbox.w, px(130));
    let run = texts(session.tree())[0];
    assert_eq!(run.bbox.x, px(85));
}

#[test]
fn test_auto_margins_center_block() {
    let mut session = Session::with_fixed_pitch(&config(300, 200));
    run(
        &mut session,
        &[
            styled("div", "width: 100px; margin-left: auto; margin-right: auto"),
            end("div"),
        ],
    );

    let rect = rects(session.tree())[0];
    assert_eq!(rect.bbox.w, px(100));
    assert_eq!(rect.bbox.x, px(100));
}

#[test]
fn test_empty_containers_add_no_line() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[start("div"), start("div"), end("div"), end("div"), start("br")],
    );

    let all = rects(session.tree());
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].bbox.h, Fx::ZERO);
    assert_eq!(root_cursor(&session), Cursor::default());

    // closing an already empty line is a no-op
    let cursor = root_cursor(&session);
    session
        .context_mut()
        .finalize_line(Some(LayoutStack::ROOT), Some(LayoutStack::ROOT));
    assert_eq!(root_cursor(&session), cursor);
}

#[test]
fn test_missing_frames_are_ignored() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    session.context_mut().finalize_line(None, Some(LayoutStack::ROOT));
    session.context_mut().finalize_line(Some(7), Some(LayoutStack::ROOT));
    assert_eq!(root_cursor(&session), Cursor::default());
}

#[test]
fn test_text_wraps_onto_new_lines() {
    let mut session = Session::with_fixed_pitch(&config(60, 200));
    run(
        &mut session,
        &[
            styled("div", "font-size: 10px"),
            text("aaaa bbbb cccc"),
            end("div"),
        ],
    );

    let runs = texts(session.tree());
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].as_text().unwrap().text.trim_end(), "aaaa bbbb");
    assert_eq!(runs[0].bbox.y, Fx::ZERO);
    assert!(!runs[0].runon);

    assert_eq!(runs[1].as_text().unwrap().text, "cccc");
    assert_eq!(runs[1].bbox.x, Fx::ZERO);
    assert_eq!(runs[1].bbox.y, px(10));
    assert!(!runs[1].runon);

    let rect = rects(session.tree())[0];
    assert_eq!(rect.bbox.h, px(20));
}

#[test]
fn test_fragment_wraps_at_container_edge() {
    let mut session = Session::new(&config(320, 200), Box::new(StubFonts));
    run(
        &mut session,
        &[
            styled("div", "width: 100px"),
            text("aaaaa"),
            text(" bbbbbb"),
            end("div"),
        ],
    );

    let runs = texts(session.tree());
    let last = runs.last().unwrap();
    assert_eq!(last.as_text().unwrap().text, "bbbbbb");
    assert_eq!(last.bbox.x, Fx::ZERO);
    assert_eq!(last.bbox.y, px(16));
    for run in &runs {
        assert!(run.bbox.right() <= px(100), "{:?} overflows", run.bbox);
    }
}

#[test]
fn test_inline_runs_continue_the_line() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[
            styled("div", "font-size: 10px"),
            text("one"),
            start("b"),
            text(" two"),
            end("b"),
            end("div"),
        ],
    );

    let runs = texts(session.tree());
    assert_eq!(runs.len(), 2);
    assert!(runs[1].runon);
    assert_eq!(runs[1].bbox.x, px(18));
    assert_eq!(runs[1].bbox.y, Fx::ZERO);
}

#[test]
fn test_line_break_starts_new_line() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[
            start("div"),
            text("ab"),
            start("br"),
            text("cd"),
            end("div"),
        ],
    );

    let runs = texts(session.tree());
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[1].bbox.x, Fx::ZERO);
    assert_eq!(runs[1].bbox.y, px(16));
    assert!(!runs[1].runon);
    assert_eq!(rects(session.tree())[0].bbox.h, px(32));
}

#[test]
fn test_break_then_close_is_one_line() {
    let mut session = Session::new(&config(320, 200), Box::new(StubFonts));
    run(
        &mut session,
        &[
            start("div"),
            styled("span", "font-size: 16px"),
            text("A"),
            end("span"),
            styled("span", "font-size: 20px"),
            text("B"),
            end("span"),
            start("br"),
            end("div"),
        ],
    );

    let runs = texts(session.tree());
    let (small, large) = (runs[0], runs[1]);
    assert_eq!(small.bbox.y - large.bbox.y, px(8));
    assert_eq!(rects(session.tree())[0].bbox.h, px(20));
    assert_eq!(root_cursor(&session).y, px(20));
}

#[test]
fn test_heading_inside_container_is_one_line() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[start("div"), start("h1"), text("T"), end("h1"), end("div")],
    );

    let heading = texts(session.tree())[0];
    assert_eq!(heading.bbox.y, Fx::ZERO);
    assert_eq!(rects(session.tree())[0].bbox.h, px(32));
    assert_eq!(root_cursor(&session).y, px(32));
}

#[test]
fn test_consecutive_breaks_add_no_blank_line() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[
            start("div"),
            text("ab"),
            start("br"),
            start("br"),
            text("cd"),
            end("div"),
        ],
    );

    let runs = texts(session.tree());
    assert_eq!(runs[1].bbox.y, px(16));
    assert_eq!(rects(session.tree())[0].bbox.h, px(32));
}

#[test]
fn test_heading_spacing() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[
            styled("h1", "margin-top: 4px; padding-top: 2px; margin-bottom: 3px"),
            text("Title"),
            end("h1"),
            text("body"),
            Event::Complete,
        ],
    );

    let runs = texts(session.tree());
    assert_eq!(runs.len(), 2);
    let heading = runs[0];
    assert_eq!(heading.bbox.y, px(6));
    assert_eq!(heading.bbox.h, px(32));
    assert_eq!(heading.as_text().unwrap().font.line_height(), px(32));

    // 6 above, 32 of heading line, 3 below
    assert_eq!(runs[1].bbox.y, px(41));
    assert!(!runs[1].runon);
    assert_eq!(root_cursor(&session).y, px(57));
}

#[test]
fn test_images_with_known_and_explicit_size() {
    let mut cfg = config(320, 200);
    cfg.base_url = Some("http://x/".to_string());
    let _ = cfg.images.insert("http://x/a.png".to_string(), [40, 30]);
    let mut session = Session::with_fixed_pitch(&cfg);
    run(
        &mut session,
        &[
            Event::Start(ElementStart::new("img").attr("src", "a.png").attr("id", "logo")),
            Event::Start(
                ElementStart::new("img")
                    .attr("src", "big.png")
                    .style("width: 500px; height: 10px; position: absolute"),
            ),
        ],
    );

    let tree = session.tree();
    let logo = tree.get(tree.by_id("logo").unwrap()).unwrap();
    assert_eq!(logo.bbox, LayoutRect::new(px(0), px(0), px(40), px(30)));
    assert_eq!(root_cursor(&session), Cursor { x: px(40), y: px(30) });

    // too wide and no natural size: capped at the room left
    let (_, big) = tree.iter().nth(1).unwrap();
    assert_eq!(big.bbox.w, px(320));
    assert_eq!(big.bbox.h, px(10));
    match &big.kind {
        PrimitiveKind::Image(image) => {
            assert_eq!(image.url, "http://x/big.png");
            assert!(!image.deferred);
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn test_oversize_width_gives_way_to_natural_size() {
    let mut cfg = config(320, 200);
    let _ = cfg.images.insert("a.png".to_string(), [40, 30]);
    let mut session = Session::with_fixed_pitch(&cfg);
    run(
        &mut session,
        &[
            Event::Start(
                ElementStart::new("img")
                    .attr("src", "a.png")
                    .style("width: 500px"),
            ),
            Event::Start(
                ElementStart::new("img")
                    .attr("src", "a.png")
                    .style("width: 20px"),
            ),
        ],
    );

    let images: Vec<_> = session.tree().iter().map(|(_, p)| p.bbox).collect();
    assert_eq!(images[0], LayoutRect::new(px(0), px(0), px(40), px(30)));
    assert_eq!(images[1].w, px(20));
    assert_eq!(images[1].h, px(30));
}

#[test]
fn test_image_deferred_until_size_known() {
    let mut cfg = config(320, 200);
    cfg.base_url = Some("http://x/".to_string());
    let mut session = Session::with_fixed_pitch(&cfg);
    run(
        &mut session,
        &[Event::Start(ElementStart::new("img").attr("src", "b.png"))],
    );

    let (id, image) = session.tree().iter().next().unwrap();
    assert_eq!(image.bbox.w, Fx::ZERO);
    assert!(matches!(&image.kind, PrimitiveKind::Image(i) if i.deferred));
    assert_eq!(root_cursor(&session), Cursor::default());
    assert_eq!(
        session.context().images().pending().collect::<Vec<_>>(),
        vec!["http://x/b.png"]
    );

    session
        .context_mut()
        .images_mut()
        .set_natural_size("http://x/b.png", Size::from_whole(8, 9));
    session.feed(&Event::Complete).unwrap();
    let image = session.tree().get(id).unwrap();
    assert_eq!(image.bbox.w, px(8));
    assert_eq!(image.bbox.h, px(9));
}

#[test]
fn test_image_without_src_is_skipped() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(&mut session, &[start("img")]);
    assert!(session.tree().is_empty());
}

#[test]
fn test_hidden_subtree_produces_nothing() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[
            styled("div", "display: none"),
            text("hidden"),
            start("div"),
            text("also hidden"),
            end("div"),
            end("div"),
            text("shown"),
            Event::Complete,
        ],
    );

    let runs = texts(session.tree());
    assert_eq!(session.tree().len(), 1);
    assert_eq!(runs[0].as_text().unwrap().text, "shown");
}

#[test]
fn test_text_below_viewport_is_skipped() {
    let mut session = Session::with_fixed_pitch(&config(320, 20));
    run(
        &mut session,
        &[
            start("div"),
            text("one"),
            start("br"),
            text("two"),
            start("br"),
            text("three"),
            end("div"),
        ],
    );

    // the third line would start at y 32, below the 20px viewport
    let runs = texts(session.tree());
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[1].as_text().unwrap().text, "two");
}

#[test]
fn test_primitive_limit_is_fatal() {
    init_logging();
    let cfg = LayoutConfig {
        primitive_limit: Some(1),
        ..config(320, 200)
    };
    let mut session = Session::with_fixed_pitch(&cfg);
    session.feed(&start("div")).unwrap();
    let err = session.feed(&text("Hi")).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::Display(DisplayError::Exhausted { limit: 1 })
    ));
    assert!(session.is_aborted());
    assert_eq!(session.tree().len(), 1);
}

#[test]
fn test_absolute_container_leaves_flow_alone() {
    let mut session = Session::with_fixed_pitch(&config(320, 200));
    run(
        &mut session,
        &[
            styled("div", "position: absolute; left: 50px; top: 60px; width: 20px"),
            text("x"),
            end("div"),
        ],
    );

    let rect = rects(session.tree())[0];
    assert_eq!(rect.bbox.x, px(50));
    assert_eq!(rect.bbox.y, px(60));
    assert_eq!(rect.bbox.w, px(20));
    assert_eq!(root_cursor(&session), Cursor::default());
}

#[test]
fn test_padding_offsets_content_and_box() {
    let mut session = Session::new(&config(320, 200), Box::new(StubFonts));
    run(
        &mut session,
        &[
            styled("div", "padding: 5px; background-color: red"),
            text("ab"),
            end("div"),
        ],
    );

    let rect = rects(session.tree())[0];
    let run = texts(session.tree())[0];
    assert_eq!(run.bbox.x, px(5));
    assert_eq!(run.bbox.y, px(5));
    // 5 + 16 + 5 tall, 5 + 20 + 5 wide
    assert_eq!(rect.bbox.h, px(26));
    assert_eq!(rect.bbox.w, px(30));
    assert_eq!(root_cursor(&session).y, px(26));
}

#[quickcheck]
fn prop_root_cursor_never_moves_up(ops: Vec<u8>) -> bool {
    let mut session = Session::with_fixed_pitch(&config(120, 10_000));
    let mut last = Fx::ZERO;
    for op in ops {
        let event = match op % 5 {
            0 => start("div"),
            1 => end("div"),
            2 => text("lorem ipsum dolor "),
            3 => start("br"),
            _ => styled("span", "font-size: 20px"),
        };
        if session.feed(&event).is_err() {
            return false;
        }
        let y = root_cursor(&session).y;
        if y < last {
            return false;
        }
        last = y;
    }
    session.feed(&Event::Complete).is_ok() && root_cursor(&session).y >= last
}

#[test]
fn test_demo_stream() {
    init_logging();
    let events: Vec<Event> = serde_json::from_str(include_str!("../../../demos/hello.json")).unwrap();
    let cfg = LayoutConfig::from_json_str(include_str!("../../../demos/config.json")).unwrap();
    let mut session = Session::with_fixed_pitch(&cfg);
    session.run(&events).unwrap();

    let tree = session.tree();
    let card = tree.get(tree.by_id("card").unwrap()).unwrap();
    // 200 wide plus 6 padding each side, centered in 320
    assert_eq!(card.bbox.w, px(212));
    assert_eq!(card.bbox.x, px(54));
    assert!(tree.iter().any(|(_, p)| matches!(
        &p.kind,
        PrimitiveKind::Image(i) if i.url == "http://numbat.local/assets/logo.png" && !i.deferred
    )));
    assert!(!session.display_list().is_empty());
}
