mod helpers;
mod player_loop;
