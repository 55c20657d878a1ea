use transit_catalogue::{BusKind, NetworkStore, TransitIndex};

use crate::requests::{BaseRequest, BusRequest, RequestDocument, StatKind, StatRequest, StopRequest};
use crate::responses::Response;

pub const UNSUPPORTED: &str = "unsupported request type";

/// Apply base requests to a fresh store: every stop first, then road
/// distances, then buses, so the order inside the array is irrelevant.
pub fn populate_store(requests: &[BaseRequest]) -> transit_catalogue::Result<NetworkStore> {
    let mut store = NetworkStore::new();

    let stops: Vec<&StopRequest> = requests
        .iter()
        .filter_map(|request| match request {
            BaseRequest::Stop(stop) => Some(stop),
            BaseRequest::Bus(_) => None,
        })
        .collect();
    let buses: Vec<&BusRequest> = requests
        .iter()
        .filter_map(|request| match request {
            BaseRequest::Bus(bus) => Some(bus),
            BaseRequest::Stop(_) => None,
        })
        .collect();

    for stop in &stops {
        store.add_stop(&stop.name, stop.latitude, stop.longitude)?;
    }

    for stop in &stops {
        for (neighbour, meters) in &stop.road_distances {
            store.add_distance(&stop.name, neighbour, *meters)?;
        }
    }

    for bus in &buses {
        let stop_names: Vec<&str> = bus.stops.iter().map(String::as_str).collect();
        store.add_bus(&bus.name, &stop_names, BusKind::from_roundtrip(bus.is_roundtrip))?;
    }

    log::debug!(
        "Catalogue populated: {} stops, {} buses",
        store.stops().len(),
        store.buses().len()
    );

    Ok(store)
}

/// Build phase over a parsed document.
pub fn build_index(document: &RequestDocument) -> transit_catalogue::Result<TransitIndex> {
    let store = populate_store(&document.base_requests)?;
    TransitIndex::build(
        store,
        document.routing_settings,
        document.render_settings.clone(),
    )
}

pub fn answer(index: &TransitIndex, request: &StatRequest) -> Response {
    let id = request.id;
    match &request.kind {
        StatKind::Bus { name } => index
            .route_info(name)
            .map_or_else(|| Response::not_found(id), |info| Response::bus(id, info)),
        StatKind::Stop { name } => index
            .stop_buses(name)
            .map_or_else(|| Response::not_found(id), |buses| Response::stop(id, buses)),
        StatKind::Route { from, to } => index
            .route(from, to)
            .map_or_else(|| Response::not_found(id), |route| Response::route(id, &route)),
        StatKind::Unsupported => {
            log::warn!("Request {id} has an unsupported type");
            Response::error(id, UNSUPPORTED)
        }
    }
}

pub fn answer_all(index: &TransitIndex, requests: &[StatRequest]) -> Vec<Response> {
    requests.iter().map(|request| answer(index, request)).collect()
}
