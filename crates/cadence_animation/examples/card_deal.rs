//! Card Deal Demo
//!
//! Deals three cards from a deck, flips the last one, then plays the whole
//! sequence backwards:
//! - Steps chained one after the other, driven by a fixed frame clock
//! - Delegate callbacks logged as they arrive
//! - Cards raised above the deck before they move
//! - Reverse animation restoring the starting layout
//!
//! Run with: cargo run -p cadence_animation --example card_deal

use cadence_animation::{
    Animation, AnimationDelegate, AnimationStep, Easing, LayerAnimation, LayerAnimationStep,
    PlaybackConfig, Result, ViewAnimation, ViewAnimationStep,
};
use cadence_core::{InteractionLock, ObjectId, Scene, Stage};
use std::rc::Rc;

const FRAME_MS: f32 = 16.0;

const CONFIG: &str = r#"
locking_ui = true
bring_to_front = true
time_scale = 1.5
"#;

struct Logger;

impl AnimationDelegate<Scene> for Logger {
    fn animation_will_start(&self, animation: &Animation<Scene>, animated: bool) {
        tracing::info!(tag = animation.tag(), animated, "will start");
    }

    fn animation_step_finished(
        &self,
        animation: &Animation<Scene>,
        step: &dyn AnimationStep<Scene>,
        _animated: bool,
    ) {
        tracing::info!(
            tag = animation.tag(),
            objects = step.objects().len(),
            "step finished"
        );
    }

    fn animation_did_stop(&self, animation: &Animation<Scene>, _animated: bool) {
        tracing::info!(tag = animation.tag(), state = ?animation.state(), "did stop");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut scene = Scene::new();
    let deck = scene.insert("deck");
    let cards: Vec<ObjectId> = (0..3)
        .map(|i| scene.insert(format!("card {i}")))
        .collect();
    // Cards start under the deck
    scene.bring_to_front(deck);

    let mut steps: Vec<Box<dyn AnimationStep<Scene>>> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            Box::new(
                ViewAnimationStep::new(240)
                    .easing(Easing::EaseOut)
                    .tag(format!("deal {i}"))
                    .with(*card, ViewAnimation::move_by(120.0 * (i as f32 + 1.0), 0.0)),
            ) as Box<dyn AnimationStep<Scene>>
        })
        .collect();

    let last = cards[cards.len() - 1];
    steps.push(Box::new(
        LayerAnimationStep::new(300)
            .delay(60)
            .easing(Easing::EaseInOut)
            .tag("flip")
            .with(last, LayerAnimation::new().with_rotate_y(180.0)),
    ));

    let config = PlaybackConfig::from_toml_str(CONFIG)?;
    let mut deal = Animation::with_config(steps, &config)?;
    deal.set_tag("deal");

    let logger = Rc::new(Logger);
    deal.set_delegate(&logger);

    tracing::info!("{}", deal.description());
    run(&mut deal, &mut scene)?;
    print_layout(&scene, deck, &cards);

    let mut undo = deal.reverse_animation();
    run(&mut undo, &mut scene)?;
    print_layout(&scene, deck, &cards);

    Ok(())
}

fn run(animation: &mut Animation<Scene>, scene: &mut Scene) -> Result<()> {
    animation.play(scene, true)?;

    let mut frames = 0;
    while animation.is_running() {
        animation.tick(scene, FRAME_MS)?;
        frames += 1;
    }

    tracing::info!(
        tag = animation.tag(),
        frames,
        locked = scene.interaction().is_locked(),
        "playback done"
    );
    Ok(())
}

fn print_layout(scene: &Scene, deck: ObjectId, cards: &[ObjectId]) {
    for id in std::iter::once(&deck).chain(cards) {
        let (Some(name), Some(view), Some(layer)) =
            (scene.name(*id), scene.view(*id), scene.layer(*id))
        else {
            continue;
        };
        tracing::info!(
            object = name,
            x = view.x,
            rotate_y = layer.rotate_y,
            z = ?scene.z_index(*id),
            "layout"
        );
    }
}
