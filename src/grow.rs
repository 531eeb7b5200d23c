use crate::terminal::{Canvas, Screen};
use arbor::config::{AnimationConfig, GrowConfig};
use arbor::grammar::RuleSet;
use arbor::params::{self, GenerationParameters};
use arbor::profile::ActivityProfile;
use arbor::settings::Settings;
use arbor::turtle::Turtle;
use arbor::{GrowthAnimator, Phase, Scene, Tree};
use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::time::Instant;

const HELP: &[&str] = &["ARBOR", "r      Regrow", "q/Esc  Quit", "?      Toggle help"];

/// Everything needed to grow the same kind of tree again with a new seed.
struct Grower {
    rules: RuleSet,
    profile: ActivityProfile,
}

impl Grower {
    fn new(config: &GrowConfig, settings: &Settings) -> Self {
        let mut profile = ActivityProfile::new(config.score);
        if let Some(name) = &config.display_name {
            profile = profile.with_name(name.as_str());
        }
        for (lang, weight) in &config.languages {
            profile = profile.with_language(lang.as_str(), *weight);
        }

        Self {
            rules: settings.rule_set_for(profile.score, config.rules),
            profile,
        }
    }

    fn grow(&self, seed: u64) -> Tree {
        let params = params::map(self.profile.score);
        tracing::info!(seed, rules = %self.rules, "growing");

        let mut rng = StdRng::seed_from_u64(seed);
        arbor::generate_with(params, &self.rules, &Turtle::default(), &mut rng)
    }

    fn caption(&self, params: &GenerationParameters) -> Vec<String> {
        self.profile.caption(params)
    }
}

fn help_lines() -> Vec<String> {
    HELP.iter().map(|s| s.to_string()).collect()
}

/// Run the `grow` subcommand
pub fn run(config: GrowConfig, settings: Settings) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(arbor::entropy_seed);
    let grower = Grower::new(&config, &settings);

    let mut animation = settings.animation.clone();
    if let Some(step) = config.time_step {
        animation.frame_interval_ms = ((step * 1000.0).round() as u64).max(1);
    }

    if config.print {
        print_tree(&grower, seed);
        Ok(())
    } else {
        run_interactive(&grower, animation, config.live, seed)
    }
}

fn print_tree(grower: &Grower, seed: u64) {
    let mut tree = grower.grow(seed);
    tree.reveal_all();

    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut canvas = Canvas::new(width, height);
    canvas.draw_scene(&tree.scene(), &grower.caption(&tree.params));
    canvas.print_to_stdout();
}

/// What is on screen between key presses.
enum Showing {
    /// The animator owns the tree and redraws it every tick.
    Growing,
    /// A fully revealed tree drawn once.
    Still(Tree, Vec<String>),
}

fn run_interactive(
    grower: &Grower,
    animation: AnimationConfig,
    live: bool,
    mut seed: u64,
) -> io::Result<()> {
    let screen = Screen::enter()?;
    let frame = animation.frame_interval();
    let mut animator = GrowthAnimator::new(animation, seed);
    let show_help = Rc::new(Cell::new(false));
    let canvas = Rc::new(RefCell::new(Canvas::for_terminal()?));

    let mut showing = plant(grower, &mut animator, seed, live, &canvas, &show_help)?;

    loop {
        if let Some(code) = screen.poll_key(frame)? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    animator.stop();
                    break;
                }
                KeyCode::Char('r') => {
                    seed = arbor::entropy_seed();
                    showing = plant(grower, &mut animator, seed, live, &canvas, &show_help)?;
                }
                KeyCode::Char('?') => {
                    show_help.set(!show_help.get());
                    if let Showing::Still(tree, caption) = &showing {
                        draw_still(&canvas, tree, caption, show_help.get())?;
                    }
                }
                _ => {}
            }
        }

        if let Showing::Growing = showing {
            let before = animator.phase();
            let phase = animator.tick(Instant::now());
            if phase != before && phase == Phase::Settled {
                tracing::info!(seed, "tree settled");
            }
            canvas.borrow().present()?;
        }
    }

    Ok(())
}

/// Starts a new tree, cancelling whatever was growing before.
fn plant(
    grower: &Grower,
    animator: &mut GrowthAnimator,
    seed: u64,
    live: bool,
    canvas: &Rc<RefCell<Canvas>>,
    show_help: &Rc<Cell<bool>>,
) -> io::Result<Showing> {
    let mut tree = grower.grow(seed);
    let caption = grower.caption(&tree.params);
    *canvas.borrow_mut() = Canvas::for_terminal()?;

    if !live {
        animator.reset();
        tree.reveal_all();
        draw_still(canvas, &tree, &caption, show_help.get())?;
        return Ok(Showing::Still(tree, caption));
    }

    let sink = Rc::clone(canvas);
    let help = Rc::clone(show_help);
    animator.start(tree, Instant::now(), move |scene: &Scene<'_>| {
        let lines = if help.get() { help_lines() } else { caption.clone() };
        sink.borrow_mut().draw_scene(scene, &lines);
    });
    Ok(Showing::Growing)
}

fn draw_still(
    canvas: &Rc<RefCell<Canvas>>,
    tree: &Tree,
    caption: &[String],
    help: bool,
) -> io::Result<()> {
    let mut canvas = canvas.borrow_mut();
    if help {
        canvas.draw_scene(&tree.scene(), &help_lines());
    } else {
        canvas.draw_scene(&tree.scene(), caption);
    }
    canvas.present()
}
