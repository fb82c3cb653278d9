pub mod feishu_events_route;
