use serde::{Deserialize, Serialize};
use skyline::{
    CityLayoutConfig, EdgeLayoutKind, LayoutEdge, LayoutGraph, LayoutNode, LayoutPipeline,
    SublayoutSettings, Vec3,
};
use skyline_io::LayoutFormat;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Input(String),
    Layout(skyline::Error),
    LayoutFile(skyline_io::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Input(msg) => write!(f, "invalid city: {msg}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::LayoutFile(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<skyline::Error> for CliError {
    fn from(value: skyline::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<skyline::hierarchy::Error> for CliError {
    fn from(value: skyline::hierarchy::Error) -> Self {
        Self::Layout(value.into())
    }
}

impl From<skyline_io::Error> for CliError {
    fn from(value: skyline_io::Error) -> Self {
        Self::LayoutFile(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Load,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    edge_layout: Option<EdgeLayoutKind>,
    tension: Option<f32>,
    below: bool,
    layout_file: Option<String>,
    save: Option<String>,
}

fn usage() -> &'static str {
    "skyline\n\
\n\
USAGE:\n\
  skyline [layout] [--pretty] [--config <json>] [--edge-layout none|straight|spline|bundling|flat] [--tension <t>] [--below] [--save <file.gvl|file.sld>] [<path>|-]\n\
  skyline load --layout <file.gvl|file.sld> [--pretty] [--config <json>] [--edge-layout <kind>] [--tension <t>] [--below] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the city is read from stdin as JSON.\n\
  - layout places the nodes, then routes the edges; load takes the placement from a layout file.\n\
  - Rows of a layout file that cannot be applied are reported on stderr.\n\
  - Set SKYLINE_LOG (e.g. SKYLINE_LOG=debug) to see pipeline logs on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "load" => args.command = Command::Load,
            "--pretty" => args.pretty = true,
            "--below" => args.below = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--edge-layout" => {
                let Some(kind) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.edge_layout =
                    Some(EdgeLayoutKind::parse(kind.trim()).ok_or(CliError::Usage(usage()))?);
            }
            "--tension" => {
                let Some(t) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.tension = Some(t.parse::<f32>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--layout" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.layout_file = Some(path.clone());
            }
            "--save" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.save = Some(path.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Load) && args.layout_file.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

#[derive(Debug, Deserialize)]
struct NodeIn {
    id: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    scale: [f32; 3],
    #[serde(default)]
    position: [f32; 3],
    /// Defaults to "has no children".
    #[serde(default)]
    leaf: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct EdgeIn {
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
struct CityIn {
    nodes: Vec<NodeIn>,
    #[serde(default)]
    edges: Vec<EdgeIn>,
    #[serde(default)]
    sublayouts: Vec<SublayoutSettings>,
}

#[derive(Serialize)]
struct NodeOut<'a> {
    id: &'a str,
    center: [f32; 3],
    scale: [f32; 3],
    rotation: f32,
}

#[derive(Serialize)]
struct EdgeOut<'a> {
    source: &'a str,
    target: &'a str,
    kind: Option<skyline::SplineKind>,
    degree: Option<usize>,
    control_points: Vec<[f32; 3]>,
}

#[derive(Serialize)]
struct CityOut<'a> {
    node_layout: Option<String>,
    edge_layout: &'static str,
    nodes: Vec<NodeOut<'a>>,
    edges: Vec<EdgeOut<'a>>,
}

fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn array(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

fn build_city(city: &CityIn) -> Result<(LayoutGraph, Vec<LayoutEdge>), CliError> {
    let mut graph = LayoutGraph::new();
    for n in &city.nodes {
        let node = LayoutNode::leaf(n.id.clone(), vec3(n.scale)).with_center(vec3(n.position));
        graph.add_node(node)?;
    }
    for n in &city.nodes {
        let Some(parent) = n.parent.as_deref() else {
            continue;
        };
        let (Some(child), Some(parent_id)) = (graph.node_id(&n.id), graph.node_id(parent)) else {
            return Err(CliError::Input(format!(
                "node {} has unknown parent {parent}",
                n.id
            )));
        };
        graph.set_parent(child, parent_id)?;
    }
    for n in &city.nodes {
        if let Some(v) = graph.node_id(&n.id) {
            let has_children = !graph.children(v).is_empty();
            graph.node_mut(v).is_leaf = n.leaf.unwrap_or(!has_children);
        }
    }

    let mut edges = Vec::with_capacity(city.edges.len());
    for e in &city.edges {
        let endpoint = |id: &str| {
            graph.node_id(id).ok_or_else(|| {
                CliError::Input(format!(
                    "edge {} -> {} has unknown endpoint {id}",
                    e.source, e.target
                ))
            })
        };
        edges.push(LayoutEdge::new(endpoint(&e.source)?, endpoint(&e.target)?));
    }
    Ok((graph, edges))
}

fn build_config(args: &Args, city: &CityIn) -> Result<CityLayoutConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => CityLayoutConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => CityLayoutConfig::default(),
    };
    if let Some(kind) = args.edge_layout {
        config.edge_layout.kind = kind;
    }
    if let Some(tension) = args.tension {
        config.edge_layout.tension = tension;
    }
    if args.below {
        config.edge_layout.edges_above_blocks = false;
    }
    config.sublayouts.extend(city.sublayouts.iter().cloned());
    Ok(config)
}

fn save_layout(graph: &LayoutGraph, path: &str) -> Result<(), CliError> {
    let path = Path::new(path);
    let text = match LayoutFormat::from_path(path) {
        Some(LayoutFormat::Gvl) => {
            let title = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("skyline");
            skyline_io::gvl::write(graph, title)
        }
        Some(LayoutFormat::Sld) => skyline_io::sld::write(graph),
        None => return Err(CliError::Usage("--save expects a .gvl or .sld file")),
    };
    std::fs::write(path, text)?;
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let city: CityIn = serde_json::from_str(&text)?;
    let (mut graph, mut edges) = build_city(&city)?;
    let config = build_config(&args, &city)?;
    let ground_level = config.ground_level;
    let pipeline = LayoutPipeline::new(config);

    let (node_layout, edge_layout) = match args.command {
        Command::Layout => {
            let report = pipeline.run(&mut graph, &mut edges)?;
            tracing::info!(
                nodes = report.laid_out_nodes,
                edges = report.routed_edges,
                sublayouts = report.sublayouts.len(),
                "city laid out"
            );
            (Some(report.node_layout.to_string()), report.edge_layout)
        }
        Command::Load => {
            let Some(layout_file) = args.layout_file.as_deref() else {
                return Err(CliError::Usage(usage()));
            };
            let report = skyline_io::read_path(Path::new(layout_file), &mut graph, ground_level)?;
            // Individual rows were already logged as warnings.
            if !report.is_clean() {
                eprintln!("{report}");
            }
            pipeline.route_edges(&mut graph, &mut edges)?;
            let router = skyline::edge_layout(&pipeline.config().edge_layout)?;
            (None, router.name())
        }
    };

    if let Some(path) = args.save.as_deref() {
        save_layout(&graph, path)?;
    }

    let out = CityOut {
        node_layout,
        edge_layout,
        nodes: graph
            .nodes()
            .map(|(_, n)| NodeOut {
                id: &n.id,
                center: array(n.center_position),
                scale: array(n.absolute_scale),
                rotation: n.rotation,
            })
            .collect(),
        edges: edges
            .iter()
            .map(|e| EdgeOut {
                source: &graph.node(e.source).id,
                target: &graph.node(e.target).id,
                kind: e.curve.as_ref().map(|c| c.kind),
                degree: e.curve.as_ref().map(|c| c.degree),
                control_points: e
                    .curve
                    .as_ref()
                    .map(|c| c.control_points.iter().copied().map(array).collect())
                    .unwrap_or_default(),
            })
            .collect(),
    };
    write_json(&out, args.pretty)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SKYLINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
