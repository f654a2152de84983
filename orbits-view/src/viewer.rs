//! Interactive n-body viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the simulation, the frame
//! clock that feeds it, and the camera, and implements [`eframe::App`] to
//! draw and control the simulation through an egui UI.

use eframe::App;
use orbits_core::clock::FrameClock;
use orbits_core::scenario::{self, ScenarioConfig};
use orbits_core::{Body, SimResult, Simulation, Vector2};

/// Fixed time step used by the "Step" button.
const SINGLE_STEP_SECONDS: f64 = 1.0 / 60.0;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: [`Simulation`] and the [`ScenarioConfig`] it
///   was built from (kept for resets).
/// - A [`FrameClock`] turning egui frame times into step sizes.
/// - Camera state (pan/zoom) and overlay toggles.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If the simulation is running, feed the frame time to the clock and
///    call [`Simulation::step`] with the averaged interval.
/// 3. Render bodies, trails, force lines and the FPS counter.
pub struct Viewer {
    sim: Simulation,
    scenario: ScenarioConfig,
    clock: FrameClock,

    rng: rand::rngs::ThreadRng,

    zoom: f32,
    pan: egui::Vec2,
    show_trails: bool,
    show_forces: bool,
    view_rect: egui::Rect,

    last_error: Option<String>,
}

impl Viewer {
    /// Creates a stopped viewer for `scenario`.
    ///
    /// ### Errors
    /// Fails if any body in the scenario is invalid.
    pub fn new(scenario: ScenarioConfig) -> SimResult<Self> {
        let sim = scenario.build()?;
        let clock = FrameClock::new(sim.config().lag_window);

        Ok(Self {
            sim,
            scenario,
            clock,
            rng: rand::rng(),
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            show_trails: true,
            show_forces: true,
            view_rect: egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1200.0, 800.0)),
            last_error: None,
        })
    }

    pub fn start(&mut self) {
        self.sim.start();
    }

    /// Stops the simulation and forgets the frame history, so the next
    /// start does not see the pause as one long frame.
    fn stop(&mut self) {
        self.sim.stop();
        self.clock.reset();
    }

    /// Rebuilds the simulation from the loaded scenario.
    fn reset(&mut self) {
        self.stop();
        match self.scenario.build() {
            Ok(sim) => {
                self.sim = sim;
                self.last_error = None;
            }
            Err(e) => self.report_error(e.to_string()),
        }
    }

    fn report_error(&mut self, msg: String) {
        log::warn!("{msg}");
        self.last_error = Some(msg);
    }

    /// Advances exactly one tick of `dt` seconds, whatever the run state.
    fn step_once(&mut self, dt: f64) {
        let was_running = self.sim.is_running();
        self.sim.start();
        if let Err(e) = self.sim.step(dt) {
            self.report_error(e.to_string());
        }
        if !was_running {
            self.sim.stop();
        }
    }

    /// Runs one tick driven by the frame clock.
    fn advance(&mut self, now: f64) {
        let dt = self.clock.tick(now);
        match self.sim.step(dt) {
            Ok(report) if report.stopped => self.clock.reset(),
            Ok(_) => {}
            Err(e) => {
                self.stop();
                self.report_error(e.to_string());
            }
        }
    }

    /// Adds a handful of random small bodies around `center`.
    fn spawn_debris(&mut self, center: Vector2) {
        let configs = match scenario::random_bodies(20, center, 150.0, &mut self.rng) {
            Ok(configs) => configs,
            Err(e) => return self.report_error(e.to_string()),
        };
        for cfg in configs {
            if let Err(e) = cfg.to_body().and_then(|b| self.sim.add_body(b)) {
                self.report_error(e.to_string());
            }
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates keep the canvas convention (y grows downwards),
    /// are scaled by `zoom`, and offset by `pan` from the top-left of
    /// `rect`.
    fn world_to_screen(&self, p: Vector2, rect: egui::Rect) -> egui::Pos2 {
        egui::pos2(
            rect.min.x + p.x as f32 * self.zoom + self.pan.x,
            rect.min.y + p.y as f32 * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`] (up to rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vector2 {
        let x = (p.x - rect.min.x - self.pan.x) / self.zoom;
        let y = (p.y - rect.min.y - self.pan.y) / self.zoom;
        Vector2::new(x as f64, y as f64)
    }

    /// Builds the top panel UI (run controls, stepping, toggles, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let running = self.sim.is_running();
                if ui.button(if running { "⏸ Stop" } else { "▶ Start" }).clicked() {
                    if running {
                        self.stop();
                    } else {
                        self.start();
                    }
                }

                if ui.button("Step").clicked() {
                    self.step_once(SINGLE_STEP_SECONDS);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Debris").clicked() {
                    let center = self.screen_to_world(self.view_rect.center(), self.view_rect);
                    self.spawn_debris(center);
                }

                ui.separator();
                ui.checkbox(&mut self.show_trails, "Trails");
                ui.checkbox(&mut self.show_forces, "Forces");

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("tick = {}", self.sim.tick()));
                ui.label(format!("bodies = {}", self.sim.len()));
                ui.label(format!("dt = {:.4} s", self.clock.average()));
                if let Some(err) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
            });
        });
    }

    fn draw_body(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        body: &Body,
        gravity: Option<Vector2>,
    ) {
        if self.show_trails {
            for (i, p) in body.trail().iter().enumerate() {
                let alpha = (i as f32 / 100.0).min(1.0);
                let color = egui::Color32::from_white_alpha((alpha * 255.0) as u8);
                painter.circle_filled(self.world_to_screen(*p, rect), 2.0 * self.zoom, color);
            }
        }

        let center = self.world_to_screen(body.position(), rect);
        let c = body.color();
        painter.circle_filled(
            center,
            (body.radius() as f32 * self.zoom).max(1.0),
            egui::Color32::from_rgb(c.r, c.g, c.b),
        );

        if let Some(g) = gravity {
            let tip = body.position() + g * self.sim.config().force_overlay_scale;
            painter.line_segment(
                [center, self.world_to_screen(tip, rect)],
                egui::Stroke::new(1.0, egui::Color32::WHITE),
            );
        }
    }

    /// Builds the central panel where bodies are drawn and the camera is
    /// controlled.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
                let rect = response.rect;
                self.view_rect = rect;
                let painter = ui.painter_at(rect);

                // Pan with drag.
                if response.dragged() {
                    self.pan += response.drag_delta();
                }

                // Zoom around the mouse cursor.
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                    let world_before = self.screen_to_world(pointer_screen, rect);

                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                    let screen_after = self.world_to_screen(world_before, rect);
                    self.pan += pointer_screen - screen_after;
                }

                if self.sim.is_running() {
                    let now = ctx.input(|i| i.time);
                    self.advance(now);
                    ctx.request_repaint();
                }

                let field = if self.show_forces {
                    self.sim.gravity_field()
                } else {
                    Vec::new()
                };
                for (i, body) in self.sim.bodies().iter().enumerate() {
                    let gravity = field.get(i).map(|&(_, g)| g);
                    self.draw_body(&painter, rect, body, gravity);
                }

                painter.text(
                    rect.min + egui::vec2(10.0, 10.0),
                    egui::Align2::LEFT_TOP,
                    format!("FPS: {}", if self.sim.is_running() { self.clock.fps() } else { 0 }),
                    egui::FontId::monospace(14.0),
                    egui::Color32::WHITE,
                );
            });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}
