//! Binary encoding of a fully built catalogue and router.
//!
//! Layout, in order:
//!
//! 1. magic `TCIX` and a `u16` format version
//! 2. stops: name, latitude, longitude
//! 3. buses: name, kind, stop indices
//! 4. directed distances: from index, to index, meters
//! 5. render settings
//! 6. routing settings
//! 7. hub table: stop index, edge id
//! 8. edge metadata, one record per edge id; `-1` marks "no bus"
//! 9. shortest path table, one row per source vertex
//! 10. raw edges and per-vertex incidence lists
//!
//! The catalogue is replayed through the [`NetworkStore`] mutators so its
//! integrity checks run again. Router state is restored as stored.

use crate::catalogue::NetworkStore;
use crate::graph::{Edge, PathEntry, RoutingGraph, ShortestPathIndex};
use crate::identifiers::{BusId, EdgeId, StopId, VertexId};
use crate::models::settings::{Color, Offset, RenderSettings, RoutingSettings};
use crate::models::types::{BusKind, Result};
use crate::persistence::codec::{corrupt, Decoder, Encoder};
use crate::router::{EdgeInfo, TransitRouter};

pub const MAGIC: &[u8; 4] = b"TCIX";
pub const FORMAT_VERSION: u16 = 1;

const NO_INDEX: i32 = -1;

/// Everything the serve phase needs, as decoded from an index.
#[derive(Debug)]
pub struct DecodedIndex {
    pub store: NetworkStore,
    pub router: TransitRouter,
    pub render_settings: RenderSettings,
}

pub fn serialize(
    store: &NetworkStore,
    router: &TransitRouter,
    render_settings: &RenderSettings,
) -> Vec<u8> {
    let mut out = Encoder::new();
    out.bytes(MAGIC);
    out.u16(FORMAT_VERSION);

    write_catalogue(&mut out, store);
    write_render_settings(&mut out, render_settings);
    write_routing_settings(&mut out, router.settings());
    write_router(&mut out, router);

    let bytes = out.finish();
    log::info!(
        "Encoded index: {} stops, {} buses, {} edges, {} bytes",
        store.stops().len(),
        store.buses().len(),
        router.graph().edge_count(),
        bytes.len()
    );
    bytes
}

/// Decode an index. Nothing is returned unless the whole input is valid.
pub fn deserialize(bytes: &[u8]) -> Result<DecodedIndex> {
    let mut input = Decoder::new(bytes);

    if input.bytes(MAGIC.len(), "magic")? != MAGIC {
        return Err(corrupt("not a transit index file"));
    }
    let version = input.u16("format version")?;
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {version}")));
    }

    let store = read_catalogue(&mut input)?;
    let render_settings = read_render_settings(&mut input)?;
    let routing_settings = read_routing_settings(&mut input)?;
    let router = read_router(&mut input, &store, routing_settings)?;
    input.finish()?;

    log::info!(
        "Decoded index: {} stops, {} buses, {} edges from {} bytes",
        store.stops().len(),
        store.buses().len(),
        router.graph().edge_count(),
        bytes.len()
    );

    Ok(DecodedIndex {
        store,
        router,
        render_settings,
    })
}

// ============================================================================
// Catalogue
// ============================================================================

fn write_catalogue(out: &mut Encoder, store: &NetworkStore) {
    out.len(store.stops().len());
    for stop in store.stops() {
        out.str(&stop.name);
        out.f64(stop.latitude());
        out.f64(stop.longitude());
    }

    out.len(store.buses().len());
    for bus in store.buses() {
        out.str(&bus.name);
        out.u8(bus.kind as u8);
        out.len(bus.stops.len());
        for stop in &bus.stops {
            out.u32(stop.raw());
        }
    }

    let distances: Vec<_> = store.distances().collect();
    out.len(distances.len());
    for (from, to, meters) in distances {
        out.u32(from.raw());
        out.u32(to.raw());
        out.u32(meters);
    }
}

fn read_catalogue(input: &mut Decoder<'_>) -> Result<NetworkStore> {
    let mut store = NetworkStore::new();
    let mut names = Vec::new();

    let stop_count = input.len(20, "stop count")?;
    for _ in 0..stop_count {
        let name = input.string("stop name")?;
        let latitude = input.f64("stop latitude")?;
        let longitude = input.f64("stop longitude")?;
        store
            .add_stop(&name, latitude, longitude)
            .map_err(|err| corrupt(err.to_string()))?;
        names.push(name);
    }

    let bus_count = input.len(9, "bus count")?;
    let mut buses = Vec::with_capacity(bus_count);
    for _ in 0..bus_count {
        let name = input.string("bus name")?;
        let kind = input.u8("bus kind")?;
        let kind = BusKind::from_u8(kind).ok_or_else(|| corrupt(format!("invalid bus kind {kind}")))?;
        let len = input.len(4, "bus stop count")?;
        let stops = (0..len)
            .map(|_| input.u32("bus stop"))
            .collect::<Result<Vec<_>>>()?;
        buses.push((name, kind, stops));
    }

    let distance_count = input.len(12, "distance count")?;
    for _ in 0..distance_count {
        let from = input.u32("distance origin")?;
        let to = input.u32("distance destination")?;
        let meters = input.u32("distance")?;
        store
            .add_distance(stop_name(&names, from)?, stop_name(&names, to)?, meters)
            .map_err(|err| corrupt(err.to_string()))?;
    }

    for (name, kind, stops) in buses {
        let stops = stops
            .into_iter()
            .map(|raw| stop_name(&names, raw))
            .collect::<Result<Vec<_>>>()?;
        store
            .add_bus(&name, &stops, kind)
            .map_err(|err| corrupt(err.to_string()))?;
    }

    Ok(store)
}

fn stop_name(names: &[String], raw: u32) -> Result<&str> {
    names
        .get(raw as usize)
        .map(String::as_str)
        .ok_or_else(|| corrupt(format!("stop {raw} out of range")))
}

// ============================================================================
// Settings
// ============================================================================

fn write_color(out: &mut Encoder, color: &Color) {
    match color {
        Color::None => out.u8(0),
        Color::Named(name) => {
            out.u8(1);
            out.str(name);
        }
        Color::Rgb(r, g, b) => {
            out.u8(2);
            out.bytes(&[*r, *g, *b]);
        }
        Color::Rgba(r, g, b, alpha) => {
            out.u8(3);
            out.bytes(&[*r, *g, *b]);
            out.f64(*alpha);
        }
    }
}

fn read_color(input: &mut Decoder<'_>) -> Result<Color> {
    let color = match input.u8("color tag")? {
        0 => Color::None,
        1 => Color::Named(input.string("color name")?),
        2 => {
            let rgb = input.bytes(3, "rgb color")?;
            Color::Rgb(rgb[0], rgb[1], rgb[2])
        }
        3 => {
            let rgb = input.bytes(3, "rgba color")?;
            let (r, g, b) = (rgb[0], rgb[1], rgb[2]);
            Color::Rgba(r, g, b, input.f64("color alpha")?)
        }
        tag => return Err(corrupt(format!("invalid color tag {tag}"))),
    };
    Ok(color)
}

fn write_offset(out: &mut Encoder, offset: Offset) {
    out.f64(offset.0);
    out.f64(offset.1);
}

fn read_offset(input: &mut Decoder<'_>, what: &str) -> Result<Offset> {
    Ok(Offset(input.f64(what)?, input.f64(what)?))
}

fn write_render_settings(out: &mut Encoder, settings: &RenderSettings) {
    out.f64(settings.width);
    out.f64(settings.height);
    out.f64(settings.padding);
    out.f64(settings.line_width);
    out.f64(settings.stop_radius);
    out.u32(settings.bus_label_font_size);
    write_offset(out, settings.bus_label_offset);
    out.u32(settings.stop_label_font_size);
    write_offset(out, settings.stop_label_offset);
    write_color(out, &settings.underlayer_color);
    out.f64(settings.underlayer_width);
    out.len(settings.color_palette.len());
    for color in &settings.color_palette {
        write_color(out, color);
    }
}

fn read_render_settings(input: &mut Decoder<'_>) -> Result<RenderSettings> {
    let width = input.f64("width")?;
    let height = input.f64("height")?;
    let padding = input.f64("padding")?;
    let line_width = input.f64("line width")?;
    let stop_radius = input.f64("stop radius")?;
    let bus_label_font_size = input.u32("bus label font size")?;
    let bus_label_offset = read_offset(input, "bus label offset")?;
    let stop_label_font_size = input.u32("stop label font size")?;
    let stop_label_offset = read_offset(input, "stop label offset")?;
    let underlayer_color = read_color(input)?;
    let underlayer_width = input.f64("underlayer width")?;
    let palette_len = input.len(1, "palette size")?;
    let color_palette = (0..palette_len)
        .map(|_| read_color(input))
        .collect::<Result<Vec<_>>>()?;

    Ok(RenderSettings {
        width,
        height,
        padding,
        line_width,
        stop_radius,
        bus_label_font_size,
        bus_label_offset,
        stop_label_font_size,
        stop_label_offset,
        underlayer_color,
        underlayer_width,
        color_palette,
    })
}

fn write_routing_settings(out: &mut Encoder, settings: &RoutingSettings) {
    out.u32(settings.bus_wait_time);
    out.f64(settings.bus_velocity);
}

fn read_routing_settings(input: &mut Decoder<'_>) -> Result<RoutingSettings> {
    let bus_wait_time = input.u32("bus wait time")?;
    let bus_velocity = input.f64("bus velocity")?;
    Ok(RoutingSettings::new(bus_wait_time, bus_velocity))
}

// ============================================================================
// Router
// ============================================================================

fn write_router(out: &mut Encoder, router: &TransitRouter) {
    let hubs: Vec<_> = router
        .hubs()
        .iter()
        .enumerate()
        .filter_map(|(stop, hub)| hub.map(|edge| (StopId::next(stop), edge)))
        .collect();
    out.len(hubs.len());
    for (stop, edge) in hubs {
        out.u32(stop.raw());
        out.u32(edge.raw());
    }

    out.len(router.edge_infos().len());
    for info in router.edge_infos() {
        out.bool(info.is_wait);
        out.f64(info.duration);
        out.u32(info.span_count);
        out.i32(info.bus.map_or(NO_INDEX, |bus| bus.raw() as i32));
        out.u32(info.stop.raw());
    }

    let graph = router.graph();
    match graph.index() {
        Some(index) => {
            out.bool(true);
            out.len(index.rows().len());
            for row in index.rows() {
                out.len(row.len());
                for entry in row {
                    out.bool(entry.is_some());
                    if let Some(entry) = entry {
                        out.f64(entry.weight);
                        out.bool(entry.last_edge.is_some());
                        if let Some(edge) = entry.last_edge {
                            out.u32(edge.raw());
                        }
                    }
                }
            }
        }
        None => out.bool(false),
    }

    out.len(graph.edges().len());
    for edge in graph.edges() {
        out.u32(edge.from.raw());
        out.u32(edge.to.raw());
        out.f64(edge.weight);
    }

    out.len(graph.incidence_lists().len());
    for list in graph.incidence_lists() {
        out.len(list.len());
        for edge in list {
            out.u32(edge.raw());
        }
    }
}

type Table = Vec<Vec<Option<PathEntry<f64>>>>;

fn read_router(
    input: &mut Decoder<'_>,
    store: &NetworkStore,
    settings: RoutingSettings,
) -> Result<TransitRouter> {
    let stop_count = store.stops().len();
    let bus_count = store.buses().len();

    let hub_count = input.len(8, "hub count")?;
    let mut hubs = vec![None; stop_count];
    for _ in 0..hub_count {
        let stop = input.u32("hub stop")? as usize;
        let edge = EdgeId::new(input.u32("hub edge")?);
        let slot = hubs
            .get_mut(stop)
            .ok_or_else(|| corrupt(format!("hub stop {stop} out of range")))?;
        if slot.replace(edge).is_some() {
            return Err(corrupt(format!("stop {stop} has two hubs")));
        }
    }

    let info_count = input.len(21, "edge metadata count")?;
    let mut edge_info = Vec::with_capacity(info_count);
    for _ in 0..info_count {
        let is_wait = input.bool("wait flag")?;
        let duration = input.f64("edge duration")?;
        let span_count = input.u32("span count")?;
        let bus = match input.i32("edge bus")? {
            NO_INDEX => None,
            raw if raw >= 0 && (raw as usize) < bus_count => Some(BusId::new(raw as u32)),
            raw => return Err(corrupt(format!("edge bus {raw} out of range"))),
        };
        let stop = input.u32("edge stop")?;
        if stop as usize >= stop_count {
            return Err(corrupt(format!("edge stop {stop} out of range")));
        }
        edge_info.push(EdgeInfo {
            is_wait,
            duration,
            span_count,
            bus,
            stop: StopId::new(stop),
        });
    }

    let table = if input.bool("index flag")? {
        Some(read_table(input)?)
    } else {
        None
    };

    let edge_count = input.len(16, "edge count")?;
    let edges = (0..edge_count)
        .map(|_| -> Result<Edge<f64>> {
            Ok(Edge::new(
                VertexId::new(input.u32("edge origin")?),
                VertexId::new(input.u32("edge target")?),
                input.f64("edge weight")?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let vertex_count = input.len(4, "vertex count")?;
    let mut incidence = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let len = input.len(4, "incidence list")?;
        let list = (0..len)
            .map(|_| input.u32("incidence edge").map(EdgeId::new))
            .collect::<Result<Vec<_>>>()?;
        incidence.push(list);
    }

    validate_graph(&edges, &incidence, &edge_info, &hubs, table.as_ref())?;

    let index = table.map(ShortestPathIndex::from_table);
    let graph = RoutingGraph::from_parts(edges, incidence, index);
    Ok(TransitRouter::from_parts(settings, graph, hubs, edge_info))
}

fn read_table(input: &mut Decoder<'_>) -> Result<Table> {
    let rows = input.len(4, "index rows")?;
    let mut table = Vec::with_capacity(rows);
    for _ in 0..rows {
        let len = input.len(1, "index row")?;
        let mut row = Vec::with_capacity(len);
        for _ in 0..len {
            let entry = if input.bool("index entry flag")? {
                let weight = input.f64("index weight")?;
                let last_edge = if input.bool("index edge flag")? {
                    Some(EdgeId::new(input.u32("index edge")?))
                } else {
                    None
                };
                Some(PathEntry { weight, last_edge })
            } else {
                None
            };
            row.push(entry);
        }
        table.push(row);
    }
    Ok(table)
}

fn validate_graph(
    edges: &[Edge<f64>],
    incidence: &[Vec<EdgeId>],
    edge_info: &[EdgeInfo],
    hubs: &[Option<EdgeId>],
    table: Option<&Table>,
) -> Result<()> {
    let vertex_count = incidence.len();
    let edge_in_range = |edge: EdgeId| edge.index() < edges.len();

    if edge_info.len() != edges.len() {
        return Err(corrupt(format!(
            "{} edge metadata records for {} edges",
            edge_info.len(),
            edges.len()
        )));
    }

    for (id, edge) in edges.iter().enumerate() {
        if edge.from.index() >= vertex_count || edge.to.index() >= vertex_count {
            return Err(corrupt(format!("edge {id} leaves the vertex range")));
        }
    }

    for (id, (edge, info)) in edges.iter().zip(edge_info).enumerate() {
        if info.is_wait != info.bus.is_none() {
            return Err(corrupt(format!("edge {id} metadata mixes wait and ride")));
        }
        if info.duration.to_bits() != edge.weight.to_bits() {
            return Err(corrupt(format!("edge {id} weight differs from its duration")));
        }
    }

    // Every edge sits in exactly one incidence list, its origin's
    let mut listed = vec![false; edges.len()];
    for (vertex, list) in incidence.iter().enumerate() {
        for &edge in list {
            if !edge_in_range(edge) || edges[edge.index()].from.index() != vertex {
                return Err(corrupt(format!("vertex {vertex} lists foreign edge {edge}")));
            }
            if std::mem::replace(&mut listed[edge.index()], true) {
                return Err(corrupt(format!("edge {edge} listed twice")));
            }
        }
    }
    if let Some(missing) = listed.iter().position(|listed| !listed) {
        return Err(corrupt(format!("edge {missing} missing from incidence lists")));
    }

    for &edge in hubs.iter().flatten() {
        if !edge_in_range(edge) || !edge_info[edge.index()].is_wait {
            return Err(corrupt(format!("hub edge {edge} is not a wait edge")));
        }
    }

    if let Some(table) = table {
        if table.len() != vertex_count || table.iter().any(|row| row.len() != vertex_count) {
            return Err(corrupt("shortest path table is not square over the vertices"));
        }
        let dangling = table
            .iter()
            .flatten()
            .flatten()
            .filter_map(|entry| entry.last_edge)
            .any(|edge| !edge_in_range(edge));
        if dangling {
            return Err(corrupt("shortest path table refers to a missing edge"));
        }
    }

    Ok(())
}
