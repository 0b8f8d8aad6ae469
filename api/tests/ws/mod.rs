mod assignment_events_test;
mod http_channel_test;
