use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use kurbo::DEFAULT_ACCURACY;
use sweepclip::{path::polygon_from_path, BooleanOp, Clipper, Polygon};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Op {
    Union,
    Intersection,
    Difference,
    Xor,
}

impl From<Op> for BooleanOp {
    fn from(op: Op) -> Self {
        match op {
            Op::Union => BooleanOp::Union,
            Op::Intersection => BooleanOp::Intersection,
            Op::Difference => BooleanOp::Difference,
            Op::Xor => BooleanOp::Xor,
        }
    }
}

/// Computes a boolean operation between the filled regions of two SVG files.
#[derive(Parser)]
struct Args {
    subject: PathBuf,
    clipping: PathBuf,
    output: PathBuf,

    #[arg(long, value_enum)]
    op: Op,

    /// How closely to follow curves when flattening them.
    #[arg(long)]
    tolerance: Option<f64>,
}

fn svg_to_polygon(tree: &usvg::Tree, tolerance: f64) -> anyhow::Result<Polygon> {
    fn pt(p: usvg::tiny_skia_path::Point) -> kurbo::Point {
        kurbo::Point::new(p.x as f64, p.y as f64)
    }

    fn add_group(group: &usvg::Group, tolerance: f64, ret: &mut Polygon) -> anyhow::Result<()> {
        for child in group.children() {
            match child {
                usvg::Node::Group(group) => add_group(group, tolerance, ret)?,
                usvg::Node::Path(path) => {
                    let kurbo_els = path.data().segments().map(|seg| match seg {
                        usvg::tiny_skia_path::PathSegment::MoveTo(p) => {
                            kurbo::PathEl::MoveTo(pt(p))
                        }
                        usvg::tiny_skia_path::PathSegment::LineTo(p) => {
                            kurbo::PathEl::LineTo(pt(p))
                        }
                        usvg::tiny_skia_path::PathSegment::QuadTo(p0, p1) => {
                            kurbo::PathEl::QuadTo(pt(p0), pt(p1))
                        }
                        usvg::tiny_skia_path::PathSegment::CubicTo(p0, p1, p2) => {
                            kurbo::PathEl::CurveTo(pt(p0), pt(p1), pt(p2))
                        }
                        usvg::tiny_skia_path::PathSegment::Close => kurbo::PathEl::ClosePath,
                    });
                    ret.extend(polygon_from_path(kurbo_els, tolerance)?);
                }
                _ => {}
            }
        }
        Ok(())
    }

    let mut ret = Polygon::new();
    add_group(tree.root(), tolerance, &mut ret)?;
    Ok(ret)
}

fn load(path: &PathBuf, tolerance: f64) -> anyhow::Result<Polygon> {
    let input = std::fs::read_to_string(path)?;
    let tree = usvg::Tree::from_str(&input, &usvg::Options::default())?;
    svg_to_polygon(&tree, tolerance)
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let tolerance = args.tolerance.unwrap_or(DEFAULT_ACCURACY);

    let subject = load(&args.subject, tolerance)?;
    let clipping = load(&args.clipping, tolerance)?;
    let bbox = subject
        .bounding_box()
        .into_iter()
        .chain(clipping.bounding_box())
        .reduce(|a, b| a.union(&b));

    let mut result = Clipper::new(subject, clipping).compute(args.op.into())?;
    result.normalize_orientation();

    let mut document = svg::Document::new();
    if let Some(bbox) = bbox {
        let pad = 1.0;
        let (min_x, min_y) = (bbox.min_x.into_inner(), bbox.min_y.into_inner());
        let (max_x, max_y) = (bbox.max_x.into_inner(), bbox.max_y.into_inner());
        document = document.set(
            "viewBox",
            (
                min_x - pad,
                min_y - pad,
                max_x - min_x + 2.0 * pad,
                max_y - min_y + 2.0 * pad,
            ),
        );
    }

    // All contours go in one path, so that holes are drawn as holes.
    let mut data = svg::node::element::path::Data::new();
    for contour in &result {
        let mut points = contour.points().iter().map(|p| p.to_f64());
        let Some(first) = points.next() else {
            continue;
        };
        data = data.move_to(first);
        for p in points {
            data = data.line_to(p);
        }
        data = data.close();
    }
    let path = svg::node::element::Path::new()
        .set("d", data)
        .set("fill", "black")
        .set("fill-rule", "evenodd");
    document = document.add(path);

    svg::save(&args.output, &document)?;

    Ok(())
}
