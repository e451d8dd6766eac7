use anyhow::bail;

use trishade_engine::anim::{AnimationConfig, Oscillator};
use trishade_engine::core::{App, AppControl, FrameCtx, StartCtx};
use trishade_engine::render::TriangleGeometry;
use trishade_engine::shader::{
    build_program, BuildPolicy, PipelineTarget, ShaderProgram, UniformLocation, TRIANGLE,
    TRIANGLE_UNIFORMS, X_MOVE,
};

/// The built triangle program and its two uniform handles.
struct TriangleProgram {
    program: ShaderProgram,
    x_move: Option<UniformLocation>,
    change_colour: Option<UniformLocation>,
}

impl TriangleProgram {
    /// Decides whether the demo may start with a build result.
    ///
    /// A strict build that failed is an error. A lenient one is accepted even
    /// when invalid; it is then never drawn.
    fn accept(program: ShaderProgram, locations: Vec<Option<UniformLocation>>) -> anyhow::Result<Self> {
        if program.policy() == BuildPolicy::Strict && !program.is_valid() {
            match program.first_failure() {
                Some(diag) => bail!("shader program '{}' failed to build: {diag}", program.label()),
                None => bail!("shader program '{}' failed to build", program.label()),
            }
        }
        if !program.is_valid() {
            log::warn!("shader program is invalid; frames will only be cleared");
        }

        let mut locations = locations.into_iter();
        Ok(Self {
            program,
            x_move: locations.next().flatten(),
            change_colour: locations.next().flatten(),
        })
    }

    fn can_draw(&self) -> bool {
        self.program.is_valid()
    }

    /// Uniform values to write this frame. `xMove` is never among them.
    fn frame_uniforms(&self, hue: f32) -> Vec<(UniformLocation, f32)> {
        self.change_colour.map(|loc| (loc, hue)).into_iter().collect()
    }
}

/// Resources created once in `on_start`.
struct Scene {
    geometry: TriangleGeometry,
    triangle: TriangleProgram,
}

/// A scaled triangle whose colour drifts with the hue oscillator.
pub struct TriangleDemo {
    policy: BuildPolicy,
    tri: Oscillator,
    hue: Oscillator,
    scene: Option<Scene>,
}

impl TriangleDemo {
    pub fn new(anim: AnimationConfig, policy: BuildPolicy) -> Self {
        Self {
            policy,
            tri: Oscillator::new(anim.tri),
            hue: Oscillator::new(anim.hue),
            scene: None,
        }
    }

    /// Steps both oscillators once.
    fn advance(&mut self) {
        if self.tri.step() {
            log::trace!("tri offset turned at {:.4}", self.tri.value());
        }
        if self.hue.step() {
            log::trace!("hue offset turned at {:.4}", self.hue.value());
        }
    }
}

impl App for TriangleDemo {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> anyhow::Result<()> {
        let rctx = ctx.render_ctx();
        let geometry = TriangleGeometry::upload(rctx.device);

        let buffers = [geometry.layout()];
        let target = PipelineTarget {
            vertex_buffers: &buffers,
            color_format: rctx.surface_format,
        };

        let (program, locations) = build_program(
            &TRIANGLE,
            self.policy,
            Some((rctx.device, &target)),
            &TRIANGLE_UNIFORMS,
        );
        let triangle = TriangleProgram::accept(program, locations)?;

        log::info!("shader program '{}' ready", triangle.program.label());
        log::debug!("'{X_MOVE}' resolved to {:?}; left unset", triangle.x_move);

        self.scene = Some(Scene { geometry, triangle });
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.advance();

        let hue = self.hue.value();
        let Some(scene) = &self.scene else {
            return ctx.render(wgpu::Color::BLACK, |_, _| {});
        };

        ctx.render(wgpu::Color::BLACK, |rctx, target| {
            if !scene.triangle.can_draw() {
                return;
            }
            let program = &scene.triangle.program;
            for (loc, value) in scene.triangle.frame_uniforms(hue) {
                program.set_uniform_f32(rctx.queue, loc, value);
            }

            let mut rpass = target.begin_pass("trishade triangle");
            if program.bind(&mut rpass) {
                scene.geometry.draw(&mut rpass);
            }
        })
    }
}
