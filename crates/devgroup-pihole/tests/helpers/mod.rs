pub mod mock_pihole_server;
