use clusterplan::graph::{EdgeType, NodeType};
use clusterplan::{BoundaryOptions, ClusterPlanRep, ClusteredGraph, ClusteredGraphSpec, Layout};
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    ClusterPlan(clusterplan::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::ClusterPlan(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<clusterplan::Error> for CliError {
    fn from(value: clusterplan::Error) -> Self {
        Self::ClusterPlan(value)
    }
}

impl From<clusterplan::InputError> for CliError {
    fn from(value: clusterplan::InputError) -> Self {
        Self::ClusterPlan(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum OutputFormat {
    #[default]
    Json,
    Gml,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "gml" => Ok(Self::Gml),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Expansion {
    #[default]
    None,
    High,
    Low,
}

impl FromStr for Expansion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    format: OutputFormat,
    pretty: bool,
    component: usize,
    expansion: Expansion,
    no_check: bool,
    out: Option<String>,
}

#[derive(Serialize)]
struct NodeOut<'a> {
    id: usize,
    original: Option<&'a str>,
    #[serde(rename = "type")]
    node_type: &'static str,
    cluster: Option<usize>,
}

#[derive(Serialize)]
struct EdgeOut {
    id: usize,
    source: usize,
    target: usize,
    #[serde(rename = "type")]
    edge_type: &'static str,
    cluster: Option<usize>,
    boundary: bool,
}

#[derive(Serialize)]
struct RootAdjOut {
    node: usize,
    edge: usize,
}

#[derive(Serialize)]
struct ModelOut<'a> {
    component: usize,
    components: usize,
    nodes: Vec<NodeOut<'a>>,
    edges: Vec<EdgeOut>,
    root_adj: Option<RootAdjOut>,
}

fn usage() -> &'static str {
    "clusterplan-cli\n\
\n\
USAGE:\n\
  clusterplan-cli [model] [--format json|gml] [--pretty] [--component <i>] [--expand none|high|low] [--no-check] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - The input is a JSON clustered graph: nodes with positions, edges, clusters.\n\
  - model builds the planarized copy of one component, models every cluster boundary and\n\
    prints the cluster assignment as JSON (or the copy as GML).\n\
  - --expand high expands vertices of degree above four; low expands degree two and up.\n\
  - --no-check skips the embedding checks around boundary modeling.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "model" => {}
            "--pretty" => args.pretty = true,
            "--no-check" => args.no_check = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = fmt
                    .parse::<OutputFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--component" => {
                let Some(component) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.component = component
                    .parse::<usize>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--expand" => {
                let Some(mode) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.expansion = mode
                    .parse::<Expansion>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => args.input = Some("-".to_string()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            other => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(other.to_string());
            }
        }
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

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn node_type_name(t: NodeType) -> &'static str {
    match t {
        NodeType::Vertex => "vertex",
        NodeType::Dummy => "dummy",
        NodeType::Expander => "expander",
    }
}

fn edge_type_name(t: EdgeType) -> &'static str {
    match t {
        EdgeType::Association => "association",
        EdgeType::ClusterBoundary => "boundary",
        EdgeType::Expansion => "expansion",
    }
}

fn summarize<'a>(input: &'a ClusteredGraph, cpr: &ClusterPlanRep<'_>, component: usize) -> ModelOut<'a> {
    let g = cpr.graph();
    let pr = cpr.plan_rep();
    let nodes = g
        .nodes()
        .map(|v| NodeOut {
            id: v.index(),
            original: pr.original(v).and_then(|o| input.node_name(o)),
            node_type: node_type_name(pr.node_type(v)),
            cluster: cpr.cluster_id(v),
        })
        .collect();
    let edges = g
        .edges()
        .map(|e| EdgeOut {
            id: e.index(),
            source: g.source(e).index(),
            target: g.target(e).index(),
            edge_type: edge_type_name(pr.edge_type(e)),
            cluster: cpr.edge_cluster_id(e),
            boundary: cpr.is_cluster_boundary(e),
        })
        .collect();
    let root_adj = cpr.root_adj().map(|adj| RootAdjOut {
        node: g.node_of(adj).index(),
        edge: g.edge_of(adj).index(),
    });
    ModelOut {
        component,
        components: cpr.number_of_ccs(),
        nodes,
        edges,
        root_adj,
    }
}

fn layout_of(input: &ClusteredGraph, cpr: &ClusterPlanRep<'_>) -> Layout {
    let g = cpr.graph();
    let pr = cpr.plan_rep();
    let mut layout = Layout::new();
    for v in g.nodes() {
        let Some(o) = pr.original(v).or_else(|| pr.expanded_node(v).and_then(|u| pr.original(u)))
        else {
            continue;
        };
        if let Some((x, y)) = input.position(o) {
            layout.set_position(v, x, y);
        }
        if pr.original(v).is_some() {
            if let Some(name) = input.node_name(o) {
                layout.set_label(v, name);
            }
        }
    }
    layout
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let input = ClusteredGraphSpec::from_json(&text)?.build()?;

    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(args.component)?;
    cpr.model_boundaries_with(&BoundaryOptions {
        check_embedding: !args.no_check,
    })?;
    match args.expansion {
        Expansion::None => {}
        Expansion::High => {
            cpr.expand(false)?;
        }
        Expansion::Low => {
            cpr.expand(true)?;
        }
    }

    match args.format {
        OutputFormat::Gml => write_text(&cpr.to_gml_string(&layout_of(&input, &cpr)), args.out.as_deref()),
        OutputFormat::Json => {
            let out = summarize(&input, &cpr, args.component);
            let mut text = if args.pretty {
                serde_json::to_string_pretty(&out)?
            } else {
                serde_json::to_string(&out)?
            };
            text.push('\n');
            write_text(&text, args.out.as_deref())
        }
    }
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

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
