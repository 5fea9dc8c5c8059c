pub mod config;
pub mod event;
pub mod feed;
pub mod fetch;
pub mod pipeline;
pub mod publish;
pub mod reduce;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
