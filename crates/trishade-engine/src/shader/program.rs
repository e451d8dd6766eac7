use std::borrow::Cow;

use super::compile::{compile, CompiledStage};
use super::diagnostic::{error_chain, BuildDiagnostic, BuildStep};
use super::link::{link, LinkedProgram};
use super::reflect::{UniformKind, UniformLocation};
use super::validate::{check, PipelineTarget};
use super::ShaderStage;

/// Where a program is in its build sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProgramState {
    Created,
    StagesAttached,
    Linked,
    Validated,
    /// Uniform handles resolved; the program may be used for drawing if valid.
    Ready,
    /// A build step failed under [`BuildPolicy::Strict`]. Terminal.
    Failed,
}

/// What a failed build step does to the program.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BuildPolicy {
    /// The first failure is terminal: the program moves to `Failed` and every
    /// later step is skipped.
    #[default]
    Strict,
    /// Failures are recorded and logged, then the build carries on: a failed
    /// compile still leads to a link attempt and uniform lookups always run.
    /// The state advances past failed steps, so only
    /// [`ShaderProgram::is_valid`] says whether the program can draw.
    Lenient,
}

/// Embedded GLSL text for one program.
#[derive(Debug, Copy, Clone)]
pub struct ProgramSource<'a> {
    pub label: &'a str,
    pub vertex: &'a str,
    pub fragment: &'a str,
}

struct ProgramGpu {
    pipeline: wgpu::RenderPipeline,
    bind_group: Option<wgpu::BindGroup>,
    uniform_buffers: Vec<(u32, wgpu::Buffer)>,
}

/// A shader program built step by step: attach stages, link, validate,
/// resolve uniforms.
///
/// Each step records a [`BuildDiagnostic`] on failure and logs it at error level.
pub struct ShaderProgram {
    label: String,
    policy: BuildPolicy,
    state: ProgramState,

    stages: Vec<CompiledStage>,
    linked: Option<LinkedProgram>,
    gpu: Option<ProgramGpu>,

    diagnostics: Vec<BuildDiagnostic>,
}

impl ShaderProgram {
    pub fn new(label: impl Into<String>, policy: BuildPolicy) -> Self {
        Self {
            label: label.into(),
            policy,
            state: ProgramState::Created,
            stages: Vec::new(),
            linked: None,
            gpu: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn policy(&self) -> BuildPolicy {
        self.policy
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Every diagnostic recorded so far, in build order.
    pub fn diagnostics(&self) -> &[BuildDiagnostic] {
        &self.diagnostics
    }

    /// First diagnostic of the build, if any step failed.
    pub fn first_failure(&self) -> Option<&BuildDiagnostic> {
        self.diagnostics.first()
    }

    pub fn is_linked(&self) -> bool {
        self.linked.is_some()
    }

    /// True only if validation succeeded and the pipeline exists.
    pub fn is_valid(&self) -> bool {
        self.gpu.is_some() && self.state != ProgramState::Failed
    }

    /// Alias of [`is_valid`](Self::is_valid), named after the validate step.
    pub fn validate_status(&self) -> bool {
        self.is_valid()
    }

    /// Compiles `source` and attaches it as the `stage` shader.
    ///
    /// A stage that fails to compile is not attached.
    pub fn attach(&mut self, stage: ShaderStage, source: &str) -> Result<(), BuildDiagnostic> {
        self.ensure_live(BuildStep::Compile)?;

        if self.stages.iter().any(|s| s.stage == stage) {
            return Err(self.record(BuildDiagnostic::compile(
                stage,
                format!("a {stage} shader is already attached"),
            )));
        }

        let compiled = match compile(stage, source) {
            Ok(compiled) => compiled,
            Err(log) => return Err(self.record(BuildDiagnostic::compile(stage, log))),
        };
        self.stages.push(compiled);

        let has = |s: ShaderStage| self.stages.iter().any(|c| c.stage == s);
        if self.state == ProgramState::Created && has(ShaderStage::Vertex) && has(ShaderStage::Fragment) {
            self.state = ProgramState::StagesAttached;
        }

        Ok(())
    }

    /// Links the attached stages.
    pub fn link(&mut self) -> Result<(), BuildDiagnostic> {
        self.ensure_live(BuildStep::Link)?;

        let result = link(&self.stages);
        self.advance_past(ProgramState::Linked);

        match result {
            Ok(linked) => {
                log::debug!(
                    "linked program '{}': {} uniform block(s)",
                    self.label,
                    linked.uniforms.len()
                );
                self.linked = Some(linked);
                self.state = ProgramState::Linked;
                Ok(())
            }
            Err(log) => Err(self.record(BuildDiagnostic::link(log))),
        }
    }

    /// Checks the linked program against `target` and `limits` without
    /// creating anything. The program is not modified.
    pub fn check(&self, target: &PipelineTarget<'_>, limits: &wgpu::Limits) -> Result<(), BuildDiagnostic> {
        let linked = self
            .linked
            .as_ref()
            .ok_or_else(|| BuildDiagnostic::validate("program is not linked"))?;
        check(linked, target, limits).map_err(BuildDiagnostic::validate)
    }

    /// Validates the program against the device's current state and, on success,
    /// creates the uniform buffers, bind group and render pipeline.
    ///
    /// Anything wgpu rejects while creating them is reported as a validate
    /// diagnostic; the program is then left without a pipeline.
    pub fn validate(&mut self, device: &wgpu::Device, target: &PipelineTarget<'_>) -> Result<(), BuildDiagnostic> {
        self.ensure_live(BuildStep::Validate)?;

        let result = self.check(target, &device.limits());
        self.advance_past(ProgramState::Validated);

        if let Err(diag) = result {
            return Err(self.record(diag));
        }

        // check() succeeded, so the program is linked.
        let Some(linked) = &self.linked else {
            return Ok(());
        };
        let label = &self.label;
        match capture_validation(device, || create_gpu(device, label, linked, target)) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.state = ProgramState::Validated;
                Ok(())
            }
            Err(err) => Err(self.record(BuildDiagnostic::validate(error_chain(&err)))),
        }
    }

    /// Looks up a uniform value by name.
    ///
    /// `None` when the name is not declared by any stage or the program is not
    /// linked.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.linked.as_ref()?.uniform_location(name)
    }

    /// Resolves `names` and marks the program ready.
    ///
    /// Unresolved names come back as `None`; that is not an error.
    pub fn resolve_uniforms(&mut self, names: &[&str]) -> Vec<Option<UniformLocation>> {
        let resolved: Vec<_> = names.iter().map(|n| self.uniform_location(n)).collect();

        for (name, loc) in names.iter().zip(&resolved) {
            match loc {
                Some(loc) => log::debug!("uniform '{name}' -> {loc:?}"),
                None => log::warn!("uniform '{name}' not found in program '{}'", self.label),
            }
        }

        if self.state != ProgramState::Failed {
            self.state = ProgramState::Ready;
        }

        resolved
    }

    /// Writes one `f32` uniform value.
    ///
    /// Ignored when the program has no pipeline or the location does not name
    /// an `f32` of this program.
    pub fn set_uniform_f32(&self, queue: &wgpu::Queue, location: UniformLocation, value: f32) {
        let Some(gpu) = &self.gpu else { return };
        let Some(linked) = &self.linked else { return };

        let is_f32 = linked
            .uniform_block(location.group, location.binding)
            .and_then(|b| b.members.iter().find(|m| m.offset == location.offset))
            .is_some_and(|m| m.kind == UniformKind::F32);
        if !is_f32 {
            log::debug!("set_uniform_f32: {location:?} is not an f32 uniform; ignored");
            return;
        }

        let Some((_, buffer)) = gpu
            .uniform_buffers
            .iter()
            .find(|(binding, _)| *binding == location.binding)
        else {
            return;
        };

        queue.write_buffer(buffer, u64::from(location.offset), bytemuck::bytes_of(&value));
    }

    /// Sets the pipeline and its uniforms on `rpass`.
    ///
    /// Returns `false` (and binds nothing) for a program that cannot draw.
    pub fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) -> bool {
        if !self.is_valid() {
            return false;
        }
        let Some(gpu) = &self.gpu else { return false };

        rpass.set_pipeline(&gpu.pipeline);
        if let Some(bind_group) = &gpu.bind_group {
            rpass.set_bind_group(0, bind_group, &[]);
        }
        true
    }

    fn ensure_live(&self, step: BuildStep) -> Result<(), BuildDiagnostic> {
        if self.state != ProgramState::Failed {
            return Ok(());
        }
        log::debug!("program '{}': skipping {step:?}, build already failed", self.label);
        Err(BuildDiagnostic {
            step,
            stage: None,
            log: "skipped: an earlier build step failed".to_string(),
        })
    }

    /// Lenient builds fall through: the state moves on even if the step fails.
    fn advance_past(&mut self, state: ProgramState) {
        if self.policy == BuildPolicy::Lenient {
            self.state = state;
        }
    }

    fn record(&mut self, diag: BuildDiagnostic) -> BuildDiagnostic {
        log::error!("{diag}");
        if self.policy == BuildPolicy::Strict {
            self.state = ProgramState::Failed;
        }
        self.diagnostics.push(diag.clone());
        diag
    }
}

/// Runs `create` inside a validation error scope.
///
/// Errors caught by the scope would otherwise reach the device's uncaptured
/// error handler, which panics by default.
fn capture_validation<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T, wgpu::Error> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(scope.pop()) {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

fn create_gpu(
    device: &wgpu::Device,
    label: &str,
    linked: &LinkedProgram,
    target: &PipelineTarget<'_>,
) -> ProgramGpu {
    let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label} vertex shader")),
        source: wgpu::ShaderSource::Naga(Cow::Owned(linked.vertex.module.clone())),
    });
    let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label} fragment shader")),
        source: wgpu::ShaderSource::Naga(Cow::Owned(linked.fragment.module.clone())),
    });

    let layout_entries: Vec<_> = linked
        .uniforms
        .iter()
        .map(|block| wgpu::BindGroupLayoutEntry {
            binding: block.binding,
            visibility: block.visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        })
        .collect();

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{label} bgl")),
        entries: &layout_entries,
    });

    // Uniform buffers are zero-initialized; a value nobody writes stays 0.
    let uniform_buffers: Vec<(u32, wgpu::Buffer)> = linked
        .uniforms
        .iter()
        .map(|block| {
            let size = u64::from(block.size.max(16)).next_multiple_of(16);
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label} ubo {}", block.binding)),
                size,
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            });
            (block.binding, buffer)
        })
        .collect();

    let bind_group = (!uniform_buffers.is_empty()).then(|| {
        let entries: Vec<_> = uniform_buffers
            .iter()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} bind group")),
            layout: &bind_group_layout,
            entries: &entries,
        })
    });

    let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = if uniform_buffers.is_empty() {
        Vec::new()
    } else {
        vec![&bind_group_layout]
    };

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} pipeline layout")),
        bind_group_layouts: &bind_group_layouts,
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} pipeline")),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &vs,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            buffers: target.vertex_buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: &fs,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target.color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    ProgramGpu {
        pipeline,
        bind_group,
        uniform_buffers,
    }
}

/// Runs the whole build: attach vertex, attach fragment, link, validate (when a
/// device is given), then resolve `uniforms`.
///
/// Step results are recorded on the returned program; under
/// [`BuildPolicy::Strict`] the steps after the first failure are skipped.
pub fn build_program(
    source: &ProgramSource<'_>,
    policy: BuildPolicy,
    device: Option<(&wgpu::Device, &PipelineTarget<'_>)>,
    uniforms: &[&str],
) -> (ShaderProgram, Vec<Option<UniformLocation>>) {
    let mut program = ShaderProgram::new(source.label, policy);

    // Failures are already recorded and logged by each step.
    let _ = program.attach(ShaderStage::Vertex, source.vertex);
    let _ = program.attach(ShaderStage::Fragment, source.fragment);
    let _ = program.link();
    if let Some((device, target)) = device {
        let _ = program.validate(device, target);
    }

    let locations = if program.state() == ProgramState::Failed {
        vec![None; uniforms.len()]
    } else {
        program.resolve_uniforms(uniforms)
    };

    (program, locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GpuInit, HeadlessGpu};
    use crate::render::geometry::Vertex;
    use crate::shader::{CHANGE_COLOUR, TRIANGLE, TRIANGLE_UNIFORMS, X_MOVE};

    const BROKEN_VERTEX: &str = r"#version 450
layout(location = 0) in vec3 pos;
void main() {
    gl_Position = vec4(0.4 * pos.x, 0.4 * pos.y 0.4 * pos.z, 1.0);
}
";

    const INTEGER_FRAGMENT: &str = r"#version 450
layout(location = 0) out ivec4 colour;
void main() {
    colour = ivec4(1, 0, 0, 1);
}
";

    fn read_uniform(gpu: &HeadlessGpu, program: &ShaderProgram, loc: UniformLocation) -> f32 {
        let buffers = &program.gpu.as_ref().expect("pipeline").uniform_buffers;
        let (_, buffer) = buffers
            .iter()
            .find(|(binding, _)| *binding == loc.binding)
            .expect("uniform buffer");
        let bytes = gpu.read_buffer(buffer, buffer.size()).expect("read back");
        let at = loc.offset as usize;
        f32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn broken() -> ProgramSource<'static> {
        ProgramSource {
            label: "broken",
            vertex: BROKEN_VERTEX,
            fragment: TRIANGLE.fragment,
        }
    }

    fn headless() -> Option<HeadlessGpu> {
        match HeadlessGpu::block_on(GpuInit::headless()) {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                eprintln!("skipping GPU part: {err:#}");
                None
            }
        }
    }

    #[test]
    fn state_machine_walks_through_each_step() {
        let mut program = ShaderProgram::new("triangle", BuildPolicy::Strict);
        assert_eq!(program.state(), ProgramState::Created);

        program.attach(ShaderStage::Vertex, TRIANGLE.vertex).expect("vertex");
        assert_eq!(program.state(), ProgramState::Created);
        program.attach(ShaderStage::Fragment, TRIANGLE.fragment).expect("fragment");
        assert_eq!(program.state(), ProgramState::StagesAttached);

        program.link().expect("link");
        assert_eq!(program.state(), ProgramState::Linked);

        let buffers = [Vertex::layout()];
        let target = PipelineTarget {
            vertex_buffers: &buffers,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        program
            .check(&target, &wgpu::Limits::downlevel_defaults())
            .expect("check");

        let locs = program.resolve_uniforms(&TRIANGLE_UNIFORMS);
        assert!(locs.iter().all(Option::is_some));
        assert_eq!(program.state(), ProgramState::Ready);
        assert!(program.diagnostics().is_empty());
        // Never validated against a device: no pipeline.
        assert!(!program.is_valid());
    }

    #[test]
    fn uniforms_resolve_to_distinct_bindings() {
        let (program, locs) = build_program(&TRIANGLE, BuildPolicy::Strict, None, &TRIANGLE_UNIFORMS);
        let x_move = locs[0].expect("xMove");
        let change = locs[1].expect("changeColour");
        assert_ne!(x_move.binding, change.binding);
        assert_eq!(program.uniform_location(X_MOVE), Some(x_move));
        assert_eq!(program.uniform_location(CHANGE_COLOUR), Some(change));
    }

    #[test]
    fn unknown_uniform_is_none() {
        let (mut program, _) = build_program(&TRIANGLE, BuildPolicy::Strict, None, &[]);
        assert_eq!(program.uniform_location("doesNotExist"), None);
        assert_eq!(program.resolve_uniforms(&["doesNotExist"]), vec![None]);
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn strict_syntax_error_is_terminal() {
        let (program, locs) = build_program(&broken(), BuildPolicy::Strict, None, &TRIANGLE_UNIFORMS);

        assert_eq!(program.state(), ProgramState::Failed);
        assert!(!program.validate_status());
        assert_eq!(locs, vec![None, None]);

        // One diagnostic: nothing after the failed compile ran.
        let diags = program.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].step, BuildStep::Compile);
        assert_eq!(diags[0].stage, Some(ShaderStage::Vertex));
        assert!(diags[0].to_string().contains("35633"), "{}", diags[0]);
    }

    #[test]
    fn lenient_syntax_error_falls_through_to_ready() {
        let (program, locs) = build_program(&broken(), BuildPolicy::Lenient, None, &TRIANGLE_UNIFORMS);

        // The failed compile did not stop the link attempt.
        let steps: Vec<_> = program.diagnostics().iter().map(|d| d.step).collect();
        assert_eq!(steps, vec![BuildStep::Compile, BuildStep::Link]);
        assert!(program.diagnostics()[0].to_string().contains("35633"));

        // Lookups ran, found nothing in an unlinked program, and the state fell
        // through to Ready anyway.
        assert_eq!(locs, vec![None, None]);
        assert_eq!(program.state(), ProgramState::Ready);
        assert!(!program.is_linked());
        assert!(!program.validate_status());
    }

    #[test]
    fn strict_failure_skips_later_steps() {
        let mut program = ShaderProgram::new("broken", BuildPolicy::Strict);
        assert!(program.attach(ShaderStage::Vertex, BROKEN_VERTEX).is_err());
        assert!(program.attach(ShaderStage::Fragment, TRIANGLE.fragment).is_err());
        assert!(program.link().is_err());
        assert_eq!(program.diagnostics().len(), 1);
        assert_eq!(program.state(), ProgramState::Failed);
    }

    #[test]
    fn attaching_a_stage_twice_fails() {
        let mut program = ShaderProgram::new("twice", BuildPolicy::Lenient);
        program.attach(ShaderStage::Vertex, TRIANGLE.vertex).expect("first");
        let diag = program.attach(ShaderStage::Vertex, TRIANGLE.vertex).unwrap_err();
        assert!(diag.log.contains("already attached"));
    }

    #[test]
    fn validate_without_link_fails() {
        let mut program = ShaderProgram::new("unlinked", BuildPolicy::Strict);
        let target = PipelineTarget {
            vertex_buffers: &[],
            color_format: wgpu::TextureFormat::Rgba8Unorm,
        };
        let diag = program.check(&target, &wgpu::Limits::default()).unwrap_err();
        assert_eq!(diag.step, BuildStep::Validate);
        // check() has no side effects.
        assert_eq!(program.state(), ProgramState::Created);
        assert!(program.diagnostics().is_empty());

        if let Some(gpu) = headless() {
            assert!(program.validate(gpu.device(), &target).is_err());
            assert_eq!(program.state(), ProgramState::Failed);
        }
    }

    #[test]
    fn building_twice_yields_two_valid_programs() {
        let Some(gpu) = headless() else { return };

        let buffers = [Vertex::layout()];
        let target = PipelineTarget {
            vertex_buffers: &buffers,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };

        let (a, locs_a) = build_program(
            &TRIANGLE,
            BuildPolicy::Strict,
            Some((gpu.device(), &target)),
            &TRIANGLE_UNIFORMS,
        );
        let (b, locs_b) = build_program(
            &TRIANGLE,
            BuildPolicy::Strict,
            Some((gpu.device(), &target)),
            &TRIANGLE_UNIFORMS,
        );

        for (program, locs) in [(&a, &locs_a), (&b, &locs_b)] {
            assert!(program.is_valid(), "{:?}", program.diagnostics());
            assert_eq!(program.state(), ProgramState::Ready);
            assert!(locs.iter().all(Option::is_some));
        }

        // Writes to one program's uniforms go to its own buffers.
        let change = locs_a[1].expect("changeColour");
        a.set_uniform_f32(gpu.queue(), change, 0.25);
        b.set_uniform_f32(gpu.queue(), change, -0.25);

        assert_eq!(read_uniform(&gpu, &a, change), 0.25);
        assert_eq!(read_uniform(&gpu, &b, change), -0.25);
        // Never written: stays zero.
        let x_move = locs_a[0].expect("xMove");
        assert_eq!(read_uniform(&gpu, &a, x_move), 0.0);
    }

    #[test]
    fn integer_colour_output_is_a_validate_diagnostic() {
        let Some(gpu) = headless() else { return };

        let source = ProgramSource {
            label: "ivec4 output",
            vertex: TRIANGLE.vertex,
            fragment: INTEGER_FRAGMENT,
        };
        let buffers = [Vertex::layout()];
        let target = PipelineTarget {
            vertex_buffers: &buffers,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };

        for (policy, end_state) in [
            (BuildPolicy::Strict, ProgramState::Failed),
            (BuildPolicy::Lenient, ProgramState::Ready),
        ] {
            let (program, _) = build_program(&source, policy, Some((gpu.device(), &target)), &[]);

            assert!(!program.is_valid());
            assert_eq!(program.state(), end_state);
            let diag = program.first_failure().expect("diagnostic");
            assert_eq!(diag.step, BuildStep::Validate);
            assert!(diag.to_string().starts_with("error validating program"), "{diag}");
        }
    }

    #[test]
    fn pipeline_rejected_by_device_is_a_validate_diagnostic() {
        let Some(gpu) = headless() else { return };

        // Passes the CPU check; the device refuses a stride that is not a
        // multiple of 4.
        const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: 13,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRS,
        }];
        let target = PipelineTarget {
            vertex_buffers: &buffers,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };

        for policy in [BuildPolicy::Strict, BuildPolicy::Lenient] {
            let mut program = ShaderProgram::new("odd stride", policy);
            program.attach(ShaderStage::Vertex, TRIANGLE.vertex).expect("vertex");
            program.attach(ShaderStage::Fragment, TRIANGLE.fragment).expect("fragment");
            program.link().expect("link");
            program
                .check(&target, &gpu.device().limits())
                .expect("passes the CPU check");

            let diag = program.validate(gpu.device(), &target).unwrap_err();
            assert_eq!(diag.step, BuildStep::Validate);
            assert!(!program.is_valid());
            assert_eq!(program.diagnostics().len(), 1);
        }
    }

    #[test]
    fn lenient_broken_program_never_validates_on_device() {
        let Some(gpu) = headless() else { return };

        let buffers = [Vertex::layout()];
        let target = PipelineTarget {
            vertex_buffers: &buffers,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        let (program, _) = build_program(
            &broken(),
            BuildPolicy::Lenient,
            Some((gpu.device(), &target)),
            &TRIANGLE_UNIFORMS,
        );

        let steps: Vec<_> = program.diagnostics().iter().map(|d| d.step).collect();
        assert_eq!(
            steps,
            vec![BuildStep::Compile, BuildStep::Link, BuildStep::Validate]
        );
        assert_eq!(program.state(), ProgramState::Ready);
        assert!(!program.validate_status());
    }
}
