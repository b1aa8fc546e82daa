mod ask_tell;
mod workflow;
