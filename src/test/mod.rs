mod config;
mod dump;
mod packet;
mod routing_table;
