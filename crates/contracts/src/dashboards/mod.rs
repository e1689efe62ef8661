pub mod d100_date_graph;
